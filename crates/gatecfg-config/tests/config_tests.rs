#[cfg(test)]
mod tests {
    use gatecfg_config::*;
    use gatecfg_config::writer::{parse_attributes, render};
    use gatecfg_core::{AttributeMap, AttributeSources, GateError, Result};
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::path::{Path, PathBuf};

    fn write_files(dir: &Path, files: &[(&str, &str)]) {
        for (name, text) in files {
            std::fs::write(dir.join(name), text).unwrap();
        }
    }

    fn load(files: &[(&str, &str)]) -> (tempfile::TempDir, ConfigViews) {
        let dir = tempfile::tempdir().unwrap();
        write_files(dir.path(), files);
        let views = ConfigAggregator::new(dir.path()).load().unwrap();
        (dir, views)
    }

    // ── Test modules ───────────────────────────────────────────

    /// Exports `[Storage] grid_dir` as OSG_GRID; optionally fails its check.
    struct StorageLike {
        options: OptionSet,
        fail_check: bool,
    }

    impl StorageLike {
        fn new(fail_check: bool) -> Self {
            Self {
                options: OptionSet::new(
                    "Storage",
                    vec![
                        OptionDescriptor::required("Storage", "grid_dir").maps_to("OSG_GRID"),
                        OptionDescriptor::optional("Storage", "app_dir")
                            .default_value("/opt/app")
                            .maps_to("OSG_APP"),
                    ],
                ),
                fail_check,
            }
        }
    }

    impl ConfigModule for StorageLike {
        fn name(&self) -> &str {
            "Storage"
        }
        fn section(&self) -> &str {
            "Storage"
        }
        fn parse_configuration(&mut self, view: &RawConfig) -> Result<()> {
            self.options.parse(view, &[])
        }
        fn get_attributes(&self) -> AttributeMap {
            self.options.attributes()
        }
        fn attribute_sources(&self) -> AttributeSources {
            self.options.attribute_sources()
        }
        fn warnings(&self) -> &[OptionWarning] {
            self.options.warnings()
        }
        fn check_attributes(&self, _attributes: &AttributeMap) -> bool {
            !self.fail_check
        }
    }

    /// Records every check it is asked to run.
    struct Recorder {
        name: &'static str,
        attrs: AttributeMap,
        result: bool,
        seen: RefCell<Vec<AttributeMap>>,
    }

    impl Recorder {
        fn new(name: &'static str, attrs: &[(&str, &str)], result: bool) -> Self {
            Self {
                name,
                attrs: attrs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
                result,
                seen: RefCell::new(Vec::new()),
            }
        }
    }

    impl ConfigModule for Recorder {
        fn name(&self) -> &str {
            self.name
        }
        fn section(&self) -> &str {
            self.name
        }
        fn separately_configurable(&self) -> bool {
            true
        }
        fn parse_configuration(&mut self, _view: &RawConfig) -> Result<()> {
            Ok(())
        }
        fn get_attributes(&self) -> AttributeMap {
            self.attrs.clone()
        }
        fn check_attributes(&self, attributes: &AttributeMap) -> bool {
            self.seen.borrow_mut().push(attributes.clone());
            self.result
        }
    }

    /// Drops a marker file under the output root when configured.
    struct Marker;

    impl ConfigModule for Marker {
        fn name(&self) -> &str {
            "marker"
        }
        fn section(&self) -> &str {
            "marker"
        }
        fn parse_configuration(&mut self, _view: &RawConfig) -> Result<()> {
            Ok(())
        }
        fn get_attributes(&self) -> AttributeMap {
            AttributeMap::new()
        }
        fn check_attributes(&self, _attributes: &AttributeMap) -> bool {
            true
        }
        fn configure(&self, _attributes: &AttributeMap, ctx: &ConfigureContext<'_>) -> Result<()> {
            std::fs::write(ctx.target("/marker"), "configured")?;
            Ok(())
        }
    }

    struct NoServices;

    impl ServiceControl for NoServices {
        fn reconfigure(&self, _service: &str) -> bool {
            true
        }
    }

    fn ctx<'a>(root: &'a Path, sources: &'a AttributeSources) -> ConfigureContext<'a> {
        ConfigureContext {
            root,
            sources,
            local_job_environment: Path::new("unused"),
        }
    }

    // ── Aggregator tests ───────────────────────────────────────

    #[test]
    fn test_later_file_overrides_earlier() {
        let (_dir, views) = load(&[
            ("10-a.ini", "[Storage]\ngrid_dir = /first\n"),
            ("20-b.ini", "[Storage]\ngrid_dir = /second\n"),
        ]);
        let view = views.normalized();
        assert_eq!(view.get("Storage", "grid_dir").unwrap().as_deref(), Some("/second"));
        let effective = view.get_option_location("grid_dir", "Storage").unwrap();
        assert!(effective.file().ends_with("20-b.ini"));
        let first = view.first_location("grid_dir", "Storage").unwrap();
        assert!(first.file().ends_with("10-a.ini"));
    }

    #[test]
    fn test_merge_order_is_by_file_name() {
        let (dir, views) = load(&[
            ("b.ini", "[A]\nx = from-b\n"),
            ("a.ini", "[A]\nx = from-a\n"),
            ("notes.txt", "this is not ini at all"),
        ]);
        assert_eq!(views.normalized().get("A", "x").unwrap().as_deref(), Some("from-b"));
        let names: Vec<_> = views
            .files()
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(names, vec![PathBuf::from("a.ini"), PathBuf::from("b.ini")]);
    }

    #[test]
    fn test_syntax_error_names_file() {
        let dir = tempfile::tempdir().unwrap();
        write_files(dir.path(), &[("01-ok.ini", "[A]\nx = 1\n"), ("02-bad.ini", "[A\n")]);
        let err = ConfigAggregator::new(dir.path()).load().unwrap_err();
        match err {
            GateError::Syntax { path, line, .. } => {
                assert!(path.ends_with("02-bad.ini"));
                assert_eq!(line, 1);
            }
            other => panic!("expected syntax error, got {other}"),
        }
    }

    #[test]
    fn test_missing_directory_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ConfigAggregator::new(dir.path().join("absent")).load().unwrap_err();
        assert!(matches!(err, GateError::Read { .. }));
        assert_eq!(err.verdict(), gatecfg_core::Verdict::FatalReadError);
    }

    #[test]
    fn test_case_handling() {
        let (_dir, views) = load(&[("a.ini", "[Local Settings]\nMy_Var = 1\nmy_var = 2\n")]);
        let normalized = views.view(CaseMode::Normalize);
        assert_eq!(normalized.get("local settings", "MY_VAR").unwrap().as_deref(), Some("2"));
        assert_eq!(normalized.options("Local Settings"), vec!["my_var"]);

        let preserved = views.view(CaseMode::Preserve);
        assert_eq!(preserved.get("Local Settings", "My_Var").unwrap().as_deref(), Some("1"));
        assert_eq!(preserved.get("Local Settings", "my_var").unwrap().as_deref(), Some("2"));
        assert!(preserved.get("local settings", "my_var").unwrap().is_none());
    }

    // ── Query tests ────────────────────────────────────────────

    #[test]
    fn test_query_returns_effective_value_and_file() {
        let (_dir, views) = load(&[
            ("file1.ini", "[section]\noption = A\n"),
            ("file2.ini", "[section]\noption = B\n"),
        ]);
        let rows = query(views.normalized(), "section.option").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].value, "B");
        assert!(rows[0].file.ends_with("file2.ini"));
        let first = rows[0].first_defined.as_ref().unwrap();
        assert!(first.file().ends_with("file1.ini"));
        assert_eq!(first.line(), 2);
    }

    #[test]
    fn test_query_without_override_has_no_first_definition() {
        let (_dir, views) = load(&[("a.ini", "[section]\noption = A\n")]);
        let rows = query(views.normalized(), "section.option").unwrap();
        assert_eq!(rows[0].first_defined, None);
        let json = serde_json::to_string(&rows[0]).unwrap();
        assert!(!json.contains("first_defined"));
    }

    #[test]
    fn test_query_bare_option_searches_sections() {
        let (_dir, views) = load(&[(
            "a.ini",
            "[PBS]\nenabled = True\n[SLURM]\nenabled = False\n[Squid]\nlocation = x\n",
        )]);
        let rows = query(views.normalized(), "enabled").unwrap();
        assert_eq!(rows.len(), 2);
        assert!(query(views.normalized(), "nothing.here").unwrap().is_empty());
    }

    #[test]
    fn test_query_section_with_spaces() {
        let (_dir, views) = load(&[("a.ini", "[Misc Services]\nauthorization_method = gridmap\n")]);
        let rows = query(views.normalized(), "Misc Services.authorization_method").unwrap();
        assert_eq!(rows[0].value, "gridmap");
        assert_eq!(rows[0].section, "Misc Services");
    }

    // ── Option descriptor tests ────────────────────────────────

    #[test]
    fn test_required_option_missing_is_setting_error() {
        let (_dir, views) = load(&[("a.ini", "[Storage]\napp_dir = /opt/app\n")]);
        let mut module = StorageLike::new(false);
        let err = module.parse_configuration(views.normalized()).unwrap_err();
        match err {
            GateError::Setting { option, .. } => assert_eq!(option, "grid_dir"),
            other => panic!("expected setting error, got {other}"),
        }
    }

    #[test]
    fn test_blank_values_take_defaults() {
        let (_dir, views) = load(&[(
            "a.ini",
            "[DEFAULT]\nunavailable = UNAVAILABLE\n[Storage]\ngrid_dir = /grid\napp_dir = %(unavailable)s\n",
        )]);
        let mut module = StorageLike::new(false);
        module.parse_configuration(views.normalized()).unwrap();
        let attrs = module.get_attributes();
        assert_eq!(attrs["OSG_APP"], "/opt/app");
        assert_eq!(attrs["OSG_GRID"], "/grid");
        assert!(module.warnings().is_empty());
    }

    #[test]
    fn test_unknown_option_warns_with_suggestion() {
        let (_dir, views) = load(&[("a.ini", "[Storage]\ngrid_dir = /g\ngrid_dri = /typo\n")]);
        let mut module = StorageLike::new(false);
        module.parse_configuration(views.normalized()).unwrap();
        let warnings = module.warnings();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].option, "grid_dri");
        assert_eq!(warnings[0].suggestion.as_deref(), Some("grid_dir"));
    }

    #[test]
    fn test_typed_options() {
        let (_dir, views) = load(&[(
            "a.ini",
            "[Squid]\nsize = 2048\nbad_size = lots\nflag = yes\npolicy = LRU\nlist = a, b,,c\n",
        )]);
        let view = views.normalized();
        let size = OptionDescriptor::required("Squid", "size").kind(OptionKind::Int);
        assert_eq!(size.resolve(view).unwrap().value, OptionValue::Int(2048));

        let bad = OptionDescriptor::required("Squid", "bad_size").kind(OptionKind::Int);
        assert!(matches!(bad.resolve(view), Err(GateError::Setting { .. })));

        let flag = OptionDescriptor::optional("Squid", "flag").kind(OptionKind::Bool);
        assert_eq!(flag.resolve(view).unwrap().value, OptionValue::Bool(true));

        let policy =
            OptionDescriptor::required("Squid", "policy").kind(OptionKind::Choice(&["lru", "lfu"]));
        assert_eq!(policy.resolve(view).unwrap().value, OptionValue::Str("lru".into()));

        let list = OptionDescriptor::optional("Squid", "list").kind(OptionKind::List);
        assert_eq!(
            list.resolve(view).unwrap().value,
            OptionValue::List(vec!["a".into(), "b".into(), "c".into()])
        );
    }

    #[test]
    fn test_validator_rejects_value() {
        let (_dir, views) = load(&[("a.ini", "[Site]\nemail = not-an-address\n")]);
        let email = OptionDescriptor::required("Site", "email")
            .validator(gatecfg_config::validation::check_email);
        let err = email.resolve(views.normalized()).unwrap_err();
        assert!(err.to_string().contains("not a valid email"));
    }

    #[test]
    fn test_deprecated_option_without_replacement_is_error() {
        let (_dir, views) = load(&[("a.ini", "[Misc]\nold_name = x\n")]);
        let old = OptionDescriptor::optional("Misc", "old_name").deprecated(Some("new_name"));
        assert!(matches!(old.resolve(views.normalized()), Err(GateError::Setting { .. })));
    }

    #[test]
    fn test_deprecated_option_with_replacement_is_ignored() {
        let (_dir, views) = load(&[("a.ini", "[Misc]\nold_name = x\nnew_name = y\n")]);
        let old = OptionDescriptor::optional("Misc", "old_name").deprecated(Some("new_name"));
        assert_eq!(old.resolve(views.normalized()).unwrap().value, OptionValue::Unset);
    }

    #[test]
    fn test_module_status() {
        let (_dir, views) = load(&[(
            "a.ini",
            "[On]\nenabled = True\n[Off]\nenabled = false\n[Skip]\nenabled = Ignore\n[Bad]\nenabled = sometimes\n[Bare]\n",
        )]);
        let v = views.normalized();
        assert_eq!(ModuleStatus::from_view(v, "On", ModuleStatus::Disabled).unwrap(), ModuleStatus::Enabled);
        assert_eq!(ModuleStatus::from_view(v, "Off", ModuleStatus::Enabled).unwrap(), ModuleStatus::Disabled);
        assert_eq!(ModuleStatus::from_view(v, "Skip", ModuleStatus::Disabled).unwrap(), ModuleStatus::Ignored);
        assert_eq!(ModuleStatus::from_view(v, "Bare", ModuleStatus::Enabled).unwrap(), ModuleStatus::Enabled);
        assert_eq!(ModuleStatus::from_view(v, "Absent", ModuleStatus::Enabled).unwrap(), ModuleStatus::Disabled);
        assert!(ModuleStatus::from_view(v, "Bad", ModuleStatus::Disabled).is_err());
    }

    // ── Orchestrator tests ─────────────────────────────────────

    #[test]
    fn test_zero_modules_is_fatal() {
        let err = Orchestrator::new(Vec::new()).err().unwrap();
        assert!(matches!(err, GateError::NoModules));
    }

    #[test]
    fn test_later_module_wins_attribute_collision() {
        let (_dir, views) = load(&[]);
        let mut orch = Orchestrator::new(vec![
            Box::new(Recorder::new("first", &[("SHARED", "1"), ("ONLY_FIRST", "x")], true)),
            Box::new(Recorder::new("second", &[("SHARED", "2")], true)),
        ])
        .unwrap();
        let validation = orch.run(&views).unwrap();
        assert!(validation.valid);
        assert_eq!(validation.attributes["SHARED"], "2");
        assert_eq!(validation.attributes["ONLY_FIRST"], "x");
    }

    #[test]
    fn test_all_checks_run_after_a_failure() {
        let (_dir, views) = load(&[]);
        let mut orch = Orchestrator::new(vec![
            Box::new(Recorder::new("a", &[("A", "1")], false)),
            Box::new(Recorder::new("b", &[("B", "2")], true)),
            Box::new(Recorder::new("c", &[], false)),
        ])
        .unwrap();
        let validation = orch.run(&views).unwrap();
        assert!(!validation.valid);
        assert_eq!(validation.failed, vec!["a".to_string(), "c".to_string()]);
    }

    #[test]
    fn test_parse_failure_stops_run() {
        let (_dir, views) = load(&[("a.ini", "[Storage]\n")]);
        let mut orch = Orchestrator::new(vec![
            Box::new(StorageLike::new(false)),
            Box::new(Recorder::new("after", &[], true)),
        ])
        .unwrap();
        assert!(matches!(orch.run(&views), Err(GateError::Setting { .. })));
    }

    #[test]
    fn test_force_writes_despite_failed_check() {
        let (dir, views) = load(&[("a.ini", "[Storage]\ngrid_dir = /grid\n")]);
        let out = dir.path().join("job-env.conf");
        let file = AttributeFile::new(&out).required(["OSG_GRID"]);

        let mut orch = Orchestrator::new(vec![Box::new(StorageLike::new(true))]).unwrap();
        let validation = orch.run(&views).unwrap();
        assert!(!validation.valid);

        let no_force = ApplyOptions::default();
        let err = orch
            .apply(&validation, &no_force, &ctx(dir.path(), &validation.sources), &file, &NoServices)
            .unwrap_err();
        assert!(matches!(err, GateError::InvalidConfiguration { .. }));
        assert!(!out.exists());

        let force = ApplyOptions {
            force: true,
            ..Default::default()
        };
        let report = orch
            .apply(&validation, &force, &ctx(dir.path(), &validation.sources), &file, &NoServices)
            .unwrap();
        assert_eq!(report.written, vec![out.clone()]);
        assert_eq!(read_attribute_file(&out).unwrap()["OSG_GRID"], "/grid");
    }

    #[test]
    fn test_missing_required_attribute_names_sources() {
        let (dir, views) = load(&[("a.ini", "[Storage]\ngrid_dir = /grid\n")]);
        let mut orch = Orchestrator::new(vec![Box::new(StorageLike::new(false))]).unwrap();
        let mut validation = orch.run(&views).unwrap();
        validation.attributes.remove("OSG_GRID");
        let file = AttributeFile::new(dir.path().join("env")).required(["OSG_GRID"]);
        let err = orch
            .apply(
                &validation,
                &ApplyOptions::default(),
                &ctx(dir.path(), &validation.sources),
                &file,
                &NoServices,
            )
            .unwrap_err();
        assert!(err.to_string().contains("[Storage] grid_dir"));
    }

    #[test]
    fn test_missing_required_attribute_configures_nothing() {
        let (dir, views) = load(&[("a.ini", "[Storage]\ngrid_dir = /grid\n")]);
        let mut orch =
            Orchestrator::new(vec![Box::new(StorageLike::new(false)), Box::new(Marker)]).unwrap();
        let mut validation = orch.run(&views).unwrap();
        let file = AttributeFile::new(dir.path().join("env")).required(["OSG_GRID"]);

        let report = orch
            .apply(
                &validation,
                &ApplyOptions::default(),
                &ctx(dir.path(), &validation.sources),
                &file,
                &NoServices,
            )
            .unwrap();
        assert_eq!(report.configured, vec!["Storage".to_string(), "marker".to_string()]);
        std::fs::remove_file(dir.path().join("marker")).unwrap();
        std::fs::remove_file(dir.path().join("env")).unwrap();

        validation.attributes.remove("OSG_GRID");
        let err = orch
            .apply(
                &validation,
                &ApplyOptions::default(),
                &ctx(dir.path(), &validation.sources),
                &file,
                &NoServices,
            )
            .unwrap_err();
        assert!(matches!(err, GateError::MissingAttribute { .. }));
        assert!(!dir.path().join("marker").exists());
        assert!(!dir.path().join("env").exists());
    }

    #[test]
    fn test_only_module_must_exist_and_skips_job_environment() {
        let (dir, views) = load(&[]);
        let mut orch = Orchestrator::new(vec![Box::new(Recorder::new("solo", &[("A", "1")], true))]).unwrap();
        let validation = orch.run(&views).unwrap();
        let file = AttributeFile::new(dir.path().join("env"));
        let sources = AttributeSources::new();

        let unknown = ApplyOptions {
            only_module: Some("nope".into()),
            ..Default::default()
        };
        assert!(matches!(
            orch.apply(&validation, &unknown, &ctx(dir.path(), &sources), &file, &NoServices),
            Err(GateError::UnknownModule(_))
        ));

        let solo = ApplyOptions {
            only_module: Some("SOLO".into()),
            ..Default::default()
        };
        let report = orch
            .apply(&validation, &solo, &ctx(dir.path(), &sources), &file, &NoServices)
            .unwrap();
        assert_eq!(report.configured, vec!["solo".to_string()]);
        assert!(report.written.is_empty());
    }

    #[test]
    fn test_pipeline_is_idempotent() {
        let (dir, _) = load(&[
            ("10.ini", "[Storage]\ngrid_dir = /grid\n"),
            ("20.ini", "[Storage]\napp_dir = /apps\n"),
        ]);
        let run = || {
            let views = ConfigAggregator::new(dir.path()).load().unwrap();
            let mut orch = Orchestrator::new(vec![Box::new(StorageLike::new(false))]).unwrap();
            render(&orch.run(&views).unwrap().attributes)
        };
        assert_eq!(run(), run());
    }

    // ── Writer tests ───────────────────────────────────────────

    #[test]
    fn test_optional_attribute_skipped_when_absent() {
        let mut attrs = AttributeMap::new();
        attrs.insert("OSG_GRID".into(), "/grid".into());
        let file = AttributeFile::new("unused")
            .required(["OSG_GRID"])
            .optional(["OSG_SQUID_LOCATION"]);
        let selected = file.select(&attrs, &AttributeSources::new()).unwrap();
        assert_eq!(selected.len(), 1);
    }

    #[test]
    fn test_write_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let file = AttributeFile::new(dir.path().join("absent").join("env"));
        let err = file.write(&AttributeMap::new(), &AttributeSources::new()).unwrap_err();
        assert!(matches!(err, GateError::Configure { .. }));
    }

    // ── Settings tests ─────────────────────────────────────────

    #[test]
    fn test_settings_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.paths.config_dir, PathBuf::from("/etc/gatecfg/config.d"));
        assert_eq!(settings.logging.format, "pretty");
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_partial_settings_apply_defaults() {
        let settings = SettingsLoader::parse(
            Path::new("gatecfg.toml"),
            "[paths]\nconfig_dir = \"/srv/config.d\"\n",
        )
        .unwrap();
        assert_eq!(settings.paths.config_dir, PathBuf::from("/srv/config.d"));
        assert_eq!(settings.logging.level, "warn");
    }

    #[test]
    fn test_settings_same_output_files_is_error() {
        let mut settings = Settings::default();
        settings.paths.local_job_environment = settings.paths.job_environment.clone();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_settings_loader_with_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gatecfg.toml");
        std::fs::write(&path, "[logging]\nformat = \"json\"\n").unwrap();
        let loader = SettingsLoader::load(Some(&path)).unwrap();
        assert_eq!(loader.get().logging.format, "json");
        assert_eq!(loader.path(), path.as_path());
    }

    #[test]
    fn test_settings_loader_bad_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gatecfg.toml");
        std::fs::write(&path, "[paths\n").unwrap();
        assert!(matches!(SettingsLoader::load(Some(&path)), Err(GateError::Settings(_))));
    }

    // ── Properties ─────────────────────────────────────────────

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn views_for(files: &[(String, String)]) -> ConfigViews {
            let sources: Vec<(PathBuf, String)> = files
                .iter()
                .map(|(name, text)| (PathBuf::from(name), text.clone()))
                .collect();
            ConfigViews::from_sources(&sources).unwrap()
        }

        proptest! {
            /// Files with disjoint keys merge to the same view in any order.
            #[test]
            fn proptest_disjoint_merge_is_order_independent(
                values in prop::collection::vec("[a-z0-9/]{1,12}", 1..6)
            ) {
                let files: Vec<(String, String)> = values
                    .iter()
                    .enumerate()
                    .map(|(i, v)| (format!("{i}.ini"), format!("[S]\nopt{i} = {v}\n")))
                    .collect();
                let mut reversed = files.clone();
                reversed.reverse();

                let a = views_for(&files);
                let b = views_for(&reversed);
                for (i, v) in values.iter().enumerate() {
                    let key = format!("opt{i}");
                    prop_assert_eq!(a.normalized().get("S", &key).unwrap(), Some(v.clone()));
                    prop_assert_eq!(b.normalized().get("S", &key).unwrap(), Some(v.clone()));
                }
            }

            /// On a collision the last merged file's value is effective.
            #[test]
            fn proptest_last_file_wins(
                values in prop::collection::vec("[a-z0-9]{1,8}", 2..6)
            ) {
                let files: Vec<(String, String)> = values
                    .iter()
                    .enumerate()
                    .map(|(i, v)| (format!("{i}.ini"), format!("[S]\nopt = {v}\n")))
                    .collect();
                let views = views_for(&files);
                let last = values.last().unwrap();
                prop_assert_eq!(views.normalized().get("S", "opt").unwrap(), Some(last.clone()));
                let loc = views.normalized().get_option_location("opt", "S").unwrap();
                prop_assert_eq!(loc.file(), Path::new(&files.last().unwrap().0));
            }

            /// Whatever is rendered reads back identically, quoting included.
            #[test]
            fn proptest_attribute_file_round_trip(
                entries in prop::collection::btree_map("[A-Z][A-Z0-9_]{0,15}", "[ -~\n]{0,40}", 0..10)
            ) {
                let attrs: AttributeMap = entries;
                prop_assert_eq!(parse_attributes(&render(&attrs)), attrs);
            }
        }
    }
}
