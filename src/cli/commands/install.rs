//! The `foundry install` command.
//!
//! Reconciles the system, pipx and npm sources in that order, then seeds
//! `~/.envrc`. Every selected step runs even if an earlier one failed.

use std::path::{Path, PathBuf};

use crate::cli::args::{InstallArgs, Step};
use crate::config::{ConfigDir, Settings};
use crate::envrc::{EnvrcOutcome, EnvrcSetup};
use crate::error::Result;
use crate::packages::{
    self, system_backend, NpmBackend, PackageBackend, PipxBackend, ReconcileOptions,
    ReconcileReport, Reconciler, ResolvedManager, Source, SourceOutcome,
};
use crate::shell::CommandRunner;
use crate::ui::{UiReporter, UserInterface};

use super::dispatcher::{Command, CommandResult};

/// The install command implementation.
pub struct InstallCommand<'a> {
    config_dir: PathBuf,
    gap_log: Option<PathBuf>,
    args: InstallArgs,
    runner: &'a dyn CommandRunner,
    manager: ResolvedManager,
    home: Option<PathBuf>,
}

impl<'a> InstallCommand<'a> {
    /// Create a new install command.
    pub fn new(
        config_dir: &Path,
        gap_log: Option<&Path>,
        args: InstallArgs,
        runner: &'a dyn CommandRunner,
    ) -> Self {
        Self {
            config_dir: config_dir.to_path_buf(),
            gap_log: gap_log.map(Path::to_path_buf),
            args,
            runner,
            manager: packages::resolve(),
            home: None,
        }
    }

    /// Use `manager` for system packages instead of the host's.
    pub fn with_manager(mut self, manager: ResolvedManager) -> Self {
        self.manager = manager;
        self
    }

    /// Seed `.envrc` in `home` instead of the current user's home directory.
    pub fn with_home(mut self, home: PathBuf) -> Self {
        self.home = Some(home);
        self
    }

    fn backend_for(&self, source: Source, settings: &Settings) -> Box<dyn PackageBackend> {
        match source {
            Source::System => {
                let sudo = self.manager == ResolvedManager::Apt && settings.apt_sudo.use_sudo();
                system_backend(self.manager, sudo)
            }
            Source::Pipx => Box::new(PipxBackend),
            Source::Npm => Box::new(NpmBackend::new(settings.npm_install_env())),
        }
    }

    fn reconcile_sources(
        &self,
        dir: &ConfigDir,
        settings: &Settings,
        ui: &mut dyn UserInterface,
    ) -> ReconcileReport {
        let gap_log = dir.gap_log(settings, self.gap_log.as_deref());
        tracing::debug!("Gap log: {}", gap_log.path().display());
        let reconciler = Reconciler::new(
            self.runner,
            ReconcileOptions {
                probe_timeout: settings.probe_timeout(),
                dry_run: self.args.dry_run,
            },
        )
        .with_gap_log(&gap_log);

        let mut report = ReconcileReport::new();
        for source in Source::ALL {
            if !self.args.selects(Step::from(source)) {
                tracing::debug!("Skipping {} (not selected)", source);
                continue;
            }

            let entries = match dir.load_package_list(source) {
                Ok(Some(entries)) => entries,
                Ok(None) => {
                    ui.warning(&format!(
                        "{} not found; no {} will be installed",
                        source.file_name(),
                        source.label()
                    ));
                    Vec::new()
                }
                Err(e) => {
                    ui.error(&e.to_string());
                    report.push(SourceOutcome::config_error(source, e.to_string()));
                    continue;
                }
            };

            let backend = self.backend_for(source, settings);
            let mut reporter = UiReporter::new(ui, settings.malformed_entries);
            report.push(reconciler.reconcile(source, &entries, backend.as_ref(), &mut reporter));
        }
        report
    }

    fn setup_envrc(&self, dir: &ConfigDir, settings: &Settings, ui: &mut dyn UserInterface) -> bool {
        ui.show_header("Setting up direnv");

        let template = dir.envrc_template(settings);
        let setup = match &self.home {
            Some(home) => EnvrcSetup {
                template,
                home: home.clone(),
                probe_timeout: settings.probe_timeout(),
                dry_run: self.args.dry_run,
            },
            None => match EnvrcSetup::for_current_user(
                template,
                settings.probe_timeout(),
                self.args.dry_run,
            ) {
                Ok(setup) => setup,
                Err(e) => {
                    ui.error(&format!("Failed to create .envrc template: {}", e));
                    return false;
                }
            },
        };

        match setup.run(self.runner) {
            Ok(EnvrcOutcome::DirenvMissing) => {
                ui.warning("direnv not installed, skipping setup");
                true
            }
            Ok(EnvrcOutcome::Created(path)) => {
                ui.success(&format!("Created {} from template", path.display()));
                true
            }
            Ok(EnvrcOutcome::WouldCreate(path)) => {
                ui.message(&format!("Would create {} from template", path.display()));
                true
            }
            Ok(EnvrcOutcome::AlreadyPresent(path)) => {
                ui.detail(&format!("{} already exists", path.display()));
                true
            }
            Ok(EnvrcOutcome::NoTemplate(path)) => {
                ui.detail(&format!("No envrc template at {}", path.display()));
                true
            }
            Err(e) => {
                ui.error(&format!("Failed to create .envrc template: {}", e));
                false
            }
        }
    }
}

impl Command for InstallCommand<'_> {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let dir = ConfigDir::open(&self.config_dir)?;
        let settings = dir.load_settings()?;

        ui.message(&format!(
            "foundry bootstrap ({}, config: {})",
            self.manager,
            dir.root().display()
        ));
        if self.args.dry_run {
            ui.message("Dry run: nothing will be installed");
        }

        let report = self.reconcile_sources(&dir, &settings, ui);
        let failed = report.failed_sources();
        let mut success = failed.is_empty();

        if self.args.selects(Step::Envrc) && !self.setup_envrc(&dir, &settings, ui) {
            success = false;
        }

        if success {
            ui.success("All tools installed successfully!");
        } else {
            ui.error("Some installations failed");
            if !failed.is_empty() {
                let names: Vec<&str> = failed.iter().map(|s| s.as_str()).collect();
                ui.error(&format!("Failed sources: {}", names.join(", ")));
            }
        }

        Ok(CommandResult::from_success(success))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::MockRunner;
    use crate::ui::MockUI;
    use std::fs;
    use tempfile::TempDir;

    struct Fixture {
        temp: TempDir,
    }

    impl Fixture {
        fn new(files: &[(&str, &str)]) -> Self {
            let temp = TempDir::new().unwrap();
            let config = temp.path().join("config");
            fs::create_dir_all(&config).unwrap();
            fs::create_dir_all(temp.path().join("home")).unwrap();
            for (name, content) in files {
                fs::write(config.join(name), content).unwrap();
            }
            Self { temp }
        }

        fn config_dir(&self) -> PathBuf {
            self.temp.path().join("config")
        }

        fn home(&self) -> PathBuf {
            self.temp.path().join("home")
        }

        fn run(&self, args: InstallArgs, runner: &MockRunner) -> (CommandResult, MockUI) {
            let mut ui = MockUI::new();
            let result = InstallCommand::new(&self.config_dir(), None, args, runner)
                .with_manager(ResolvedManager::Brew)
                .with_home(self.home())
                .execute(&mut ui)
                .unwrap();
            (result, ui)
        }
    }

    #[test]
    fn empty_config_succeeds() {
        let fixture = Fixture::new(&[]);
        let runner = MockRunner::new();

        let (result, ui) = fixture.run(InstallArgs::default(), &runner);

        assert!(result.success);
        assert!(ui.has_warning("packages.yaml not found"));
        assert!(ui.has_success("All tools installed successfully!"));
        assert_eq!(runner.invocations(), vec!["direnv --version"]);
    }

    #[test]
    fn failed_source_does_not_block_others() {
        let fixture = Fixture::new(&[
            ("packages.yaml", "packages: [jq]\n"),
            ("pipx.yaml", "packages: [black]\n"),
            ("npm.yaml", "packages: [typescript]\n"),
        ]);
        let mut runner = MockRunner::new();
        runner.fail("brew install jq", 1, "Error: no bottle");

        let (result, ui) = fixture.run(InstallArgs::default(), &runner);

        assert_eq!(result.exit_code, 1);
        assert_eq!(runner.invocations_matching("pipx install"), vec!["pipx install black"]);
        assert_eq!(
            runner.invocations_matching("npm install"),
            vec!["npm install -g typescript"]
        );
        assert!(ui.has_error("Some installations failed"));
        assert!(ui.has_error("Failed sources: system"));
        assert!(!ui.has_error("pipx"));
    }

    #[test]
    fn invalid_list_fails_only_its_source() {
        let fixture = Fixture::new(&[
            ("pipx.yaml", "packages: [unclosed\n"),
            ("npm.yaml", "packages: [prettier]\n"),
        ]);
        let runner = MockRunner::new();

        let (result, ui) = fixture.run(InstallArgs::default(), &runner);

        assert!(!result.success);
        assert!(ui.has_error("Failed sources: pipx"));
        assert!(runner.invocations_matching("pipx").is_empty());
        assert_eq!(runner.invocations_matching("npm install"), vec!["npm install -g prettier"]);
    }

    #[test]
    fn only_filter_limits_steps() {
        let fixture = Fixture::new(&[
            ("packages.yaml", "packages: [jq]\n"),
            ("pipx.yaml", "packages: [black]\n"),
        ]);
        let runner = MockRunner::new();
        let args = InstallArgs {
            only: vec![Step::Pipx],
            ..Default::default()
        };

        let (result, _ui) = fixture.run(args, &runner);

        assert!(result.success);
        assert!(runner.invocations_matching("brew").is_empty());
        assert!(runner.invocations_matching("direnv").is_empty());
        assert_eq!(runner.invocations_matching("pipx install"), vec!["pipx install black"]);
    }

    #[test]
    fn copies_envrc_template() {
        let fixture = Fixture::new(&[("envrc_template", "layout python\n")]);
        let runner = MockRunner::new();

        let (result, ui) = fixture.run(InstallArgs::default(), &runner);

        assert!(result.success);
        assert_eq!(
            fs::read_to_string(fixture.home().join(".envrc")).unwrap(),
            "layout python\n"
        );
        assert!(ui.has_success(".envrc"));
    }

    #[test]
    fn missing_direnv_is_not_a_failure() {
        let fixture = Fixture::new(&[("envrc_template", "layout python\n")]);
        let mut runner = MockRunner::new();
        runner.missing_program("direnv");

        let (result, ui) = fixture.run(InstallArgs::default(), &runner);

        assert!(result.success);
        assert!(ui.has_warning("direnv not installed"));
        assert!(!fixture.home().join(".envrc").exists());
    }

    #[test]
    fn npm_installs_carry_default_env() {
        let fixture = Fixture::new(&[("npm.yaml", "packages: [\"@mermaid-js/mermaid-cli\"]\n")]);
        let runner = MockRunner::new();

        fixture.run(InstallArgs::default(), &runner);

        let install = runner
            .specs()
            .into_iter()
            .find(|s| s.display().starts_with("npm install"))
            .unwrap();
        if std::env::var_os("PUPPETEER_SKIP_DOWNLOAD").is_none() {
            assert_eq!(
                install.env.get("PUPPETEER_SKIP_DOWNLOAD").map(String::as_str),
                Some("1")
            );
        }
    }

    #[test]
    fn settings_change_probe_timeout() {
        let fixture = Fixture::new(&[
            ("settings.yaml", "probe_timeout_secs: 3\n"),
            ("pipx.yaml", "packages: [black]\n"),
        ]);
        let runner = MockRunner::new();

        fixture.run(InstallArgs::default(), &runner);

        let probe = runner
            .specs()
            .into_iter()
            .find(|s| s.display() == "pipx --version")
            .unwrap();
        assert_eq!(probe.timeout, Some(std::time::Duration::from_secs(3)));
    }

    #[test]
    fn invalid_settings_abort_the_run() {
        let fixture = Fixture::new(&[("settings.yaml", "surprise: true\n")]);
        let runner = MockRunner::new();
        let mut ui = MockUI::new();

        let result = InstallCommand::new(&fixture.config_dir(), None, InstallArgs::default(), &runner)
            .execute(&mut ui);

        assert!(result.is_err());
        assert!(runner.invocations().is_empty());
    }
}
