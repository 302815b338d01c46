//! `[Site Information]`: who runs the site and where it is.

use gatecfg_config::validation::{valid_domain, valid_email};
use gatecfg_config::{ConfigModule, OptionDescriptor, OptionKind, OptionSet, OptionWarning, RawConfig};
use gatecfg_core::{AttributeMap, AttributeSources, Result};
use tracing::{debug, error};

pub const SECTION: &str = "Site Information";

const GROUPS: &[&str] = &["OSG", "OSG-ITB"];

fn check_group(value: &str) -> std::result::Result<(), String> {
    if GROUPS.contains(&value) {
        Ok(())
    } else {
        Err(format!("'{value}' is not one of: {}", GROUPS.join(", ")))
    }
}

/// Validate a sponsor list such as `osg:50 atlas:50`.
///
/// Entries are separated by whitespace or commas. A single entry may omit
/// its percentage; otherwise every entry needs one and they must add up to
/// exactly 100.
pub fn check_sponsor(value: &str) -> std::result::Result<(), String> {
    let entries: Vec<&str> = value
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .collect();
    match entries.as_slice() {
        [] => return Err("no sponsor given".into()),
        [single] if !single.contains(':') => return Ok(()),
        _ => {}
    }
    let mut total = 0u32;
    for entry in &entries {
        let Some((vo, pct)) = entry.split_once(':') else {
            return Err(format!("'{entry}' has no percentage"));
        };
        if vo.is_empty() {
            return Err(format!("'{entry}' has no VO name"));
        }
        let pct: u32 = pct
            .parse()
            .ok()
            .filter(|p| *p <= 100)
            .ok_or_else(|| format!("'{pct}' in '{entry}' is not a percentage between 0 and 100"))?;
        total += pct;
    }
    if total == 100 {
        Ok(())
    } else {
        Err(format!("percentages add up to {total}, not 100"))
    }
}

pub struct SiteInformation {
    options: OptionSet,
    present: bool,
}

impl SiteInformation {
    pub fn new() -> Self {
        let s = SECTION;
        Self {
            options: OptionSet::new(
                s,
                vec![
                    OptionDescriptor::optional(s, "group")
                        .default_value("OSG")
                        .validator(check_group)
                        .maps_to("OSG_GROUP"),
                    OptionDescriptor::required(s, "host_name").maps_to("OSG_HOSTNAME"),
                    OptionDescriptor::required(s, "resource").maps_to("OSG_SITE_NAME"),
                    OptionDescriptor::required(s, "sponsor").maps_to("OSG_SPONSOR"),
                    OptionDescriptor::optional(s, "site_policy").maps_to("OSG_SITE_INFO"),
                    OptionDescriptor::required(s, "contact").maps_to("OSG_CONTACT_NAME"),
                    OptionDescriptor::required(s, "email").maps_to("OSG_CONTACT_EMAIL"),
                    OptionDescriptor::required(s, "city").maps_to("OSG_SITE_CITY"),
                    OptionDescriptor::required(s, "country").maps_to("OSG_SITE_COUNTRY"),
                    OptionDescriptor::required(s, "longitude")
                        .kind(OptionKind::Float)
                        .maps_to("OSG_SITE_LONGITUDE"),
                    OptionDescriptor::required(s, "latitude")
                        .kind(OptionKind::Float)
                        .maps_to("OSG_SITE_LATITUDE"),
                    OptionDescriptor::optional(s, "resource_group"),
                    OptionDescriptor::optional(s, "site_name").deprecated(Some("resource")),
                ],
            ),
            present: false,
        }
    }

    /// Resource group the site's resource is registered under, if given.
    pub fn resource_group(&self) -> Option<&str> {
        self.options.str("resource_group")
    }

    fn fail(&self, option: &str, message: String) {
        error!(section = SECTION, option, "{message}");
    }
}

impl Default for SiteInformation {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigModule for SiteInformation {
    fn name(&self) -> &str {
        "SiteInformation"
    }

    fn section(&self) -> &str {
        SECTION
    }

    fn parse_configuration(&mut self, view: &RawConfig) -> Result<()> {
        self.present = view.has_section(SECTION);
        if !self.present {
            debug!(section = SECTION, "section not in configuration");
            return Ok(());
        }
        self.options.parse(view, &[])
    }

    fn get_attributes(&self) -> AttributeMap {
        if !self.present {
            return AttributeMap::new();
        }
        self.options.attributes()
    }

    fn attribute_sources(&self) -> AttributeSources {
        self.options.attribute_sources()
    }

    fn warnings(&self) -> &[OptionWarning] {
        self.options.warnings()
    }

    fn check_attributes(&self, _attributes: &AttributeMap) -> bool {
        if !self.present {
            return true;
        }
        let mut ok = true;

        if let Some(host) = self.options.str("host_name") {
            if !valid_domain(host) {
                self.fail("host_name", format!("'{host}' is not a valid host name"));
                ok = false;
            }
        }

        if let Some(email) = self.options.str("email") {
            if !valid_email(email) {
                self.fail("email", format!("'{email}' is not a valid email address"));
                ok = false;
            }
        }

        if let Some(lat) = self.options.float("latitude") {
            if !(-90.0..=90.0).contains(&lat) {
                self.fail("latitude", format!("{lat} is outside -90 to 90"));
                ok = false;
            }
        }

        if let Some(long) = self.options.float("longitude") {
            if !(-180.0..=180.0).contains(&long) {
                self.fail("longitude", format!("{long} is outside -180 to 180"));
                ok = false;
            }
        }

        if let Some(sponsor) = self.options.str("sponsor") {
            if let Err(reason) = check_sponsor(sponsor) {
                self.fail("sponsor", format!("invalid sponsor '{sponsor}': {reason}"));
                ok = false;
            }
        }

        ok
    }
}
