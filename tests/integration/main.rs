//! Integration tests for the composer-buildpack CLI

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    const FIXTURE_SHA256: &str = "9c3b540506b69920e76121b9fd94944e58b4351211dd2db332bf0b47dbf3e166";

    fn fixtures() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
    }

    /// Command isolated from the caller's config and buildpack environment
    fn buildpack(temp: &TempDir) -> Command {
        let mut cmd = cargo_bin_cmd!("composer-buildpack");
        cmd.env_remove("BP_COMPOSER_VERSION")
            .env_remove("CNB_STACK_ID")
            .env_remove("RUST_LOG")
            .arg("--config")
            .arg(temp.path().join("config.toml"));
        cmd
    }

    fn write_catalog(dir: &Path) -> PathBuf {
        let uri = "https://downloads.example.test/2.4.4/composer.phar";
        let catalog = format!(
            r#"default-version = "2.4.4"

[[dependencies]]
id = "composer"
name = "composer"
version = "2.4.4"
source = "{uri}"
source-checksum = "sha256:{sha}"
uri = "{uri}"
checksum = "sha256:{sha}"
purl = "pkg:generic/composer@2.4.4?checksum={sha}&download_url={uri}"
cpe = "cpe:2.3:a:getcomposer:composer:2.4.4:*:*:*:*:python:*:*"
licenses = ["MIT"]
stacks = ["*"]
"#,
            uri = uri,
            sha = FIXTURE_SHA256
        );
        let path = dir.join("buildpack.toml");
        fs::write(&path, catalog).unwrap();
        path
    }

    fn write_plan(dir: &Path) -> PathBuf {
        let path = dir.join("plan.toml");
        fs::write(
            &path,
            r#"[[entries]]
name = "composer"
[entries.metadata]
version = "2.4.4"
version-source = "composer.json"
launch = true
"#,
        )
        .unwrap();
        path
    }

    /// Buildpack dir with the fixture pre-fetched under `dependencies/`
    fn write_offline_dependency(dir: &Path) -> PathBuf {
        let cnb = dir.join("cnb");
        let target = cnb.join("dependencies").join(FIXTURE_SHA256);
        fs::create_dir_all(&target).unwrap();
        fs::copy(fixtures().join("artifact.phar"), target.join("composer.phar")).unwrap();
        cnb
    }

    #[test]
    fn help_displays() {
        let temp = TempDir::new().unwrap();
        buildpack(&temp)
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("retrieve"))
            .stdout(predicate::str::contains("build"))
            .stdout(predicate::str::contains("catalog"));
    }

    #[test]
    fn version_displays() {
        let temp = TempDir::new().unwrap();
        buildpack(&temp)
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("composer-buildpack"));
    }

    #[test]
    fn catalog_list_empty() {
        let temp = TempDir::new().unwrap();
        buildpack(&temp)
            .args(["catalog", "list", "--catalog"])
            .arg(temp.path().join("missing.toml"))
            .assert()
            .success()
            .stdout(predicate::str::contains("No dependencies in catalog."));
    }

    #[test]
    fn catalog_list_table() {
        let temp = TempDir::new().unwrap();
        let catalog = write_catalog(temp.path());

        buildpack(&temp)
            .args(["catalog", "list", "--catalog"])
            .arg(&catalog)
            .assert()
            .success()
            .stdout(predicate::str::contains("2.4.4"))
            .stdout(predicate::str::contains("sha256:9c3b540506b6"))
            .stdout(predicate::str::contains("Total: 1 version(s)"));
    }

    #[test]
    fn catalog_list_json() {
        let temp = TempDir::new().unwrap();
        let catalog = write_catalog(temp.path());

        let output = buildpack(&temp)
            .args(["catalog", "list", "--format", "json", "--catalog"])
            .arg(&catalog)
            .output()
            .unwrap();

        assert!(output.status.success());
        let entries: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(entries[0]["version"], "2.4.4");
        assert_eq!(entries[0]["source-checksum"], format!("sha256:{}", FIXTURE_SHA256));
    }

    #[test]
    fn build_installs_then_reuses() {
        let temp = TempDir::new().unwrap();
        let catalog = write_catalog(temp.path());
        let plan = write_plan(temp.path());
        let cnb = write_offline_dependency(temp.path());
        let layers = temp.path().join("layers");

        let run = || {
            let mut cmd = buildpack(&temp);
            cmd.arg("build")
                .arg("--plan")
                .arg(&plan)
                .arg("--layers")
                .arg(&layers)
                .arg("--cnb")
                .arg(&cnb)
                .arg("--catalog")
                .arg(&catalog);
            cmd
        };

        run()
            .assert()
            .success()
            .stdout(predicate::str::contains("rebuild (no cached layer)"))
            .stdout(predicate::str::contains("launch=true"));

        let installed = layers.join("composer/bin/composer.phar");
        assert_eq!(
            fs::read(&installed).unwrap(),
            fs::read(fixtures().join("artifact.phar")).unwrap()
        );
        let record = fs::read_to_string(layers.join("composer.toml")).unwrap();
        assert!(record.contains(FIXTURE_SHA256));

        run()
            .assert()
            .success()
            .stdout(predicate::str::contains("(reuse)"));
    }

    #[test]
    fn build_rejects_unknown_requested_version() {
        let temp = TempDir::new().unwrap();
        let catalog = write_catalog(temp.path());
        let plan = write_plan(temp.path());

        buildpack(&temp)
            .env("BP_COMPOSER_VERSION", "9.9.9")
            .arg("build")
            .arg("--plan")
            .arg(&plan)
            .arg("--layers")
            .arg(temp.path().join("layers"))
            .arg("--catalog")
            .arg(&catalog)
            .assert()
            .failure()
            .stderr(predicate::str::contains("No version of composer matches '9.9.9'"))
            .stderr(predicate::str::contains("catalog list"));

        assert!(!temp.path().join("layers/composer.toml").exists());
    }

    #[test]
    fn build_with_invalid_plan_fails() {
        let temp = TempDir::new().unwrap();
        let plan = temp.path().join("plan.toml");
        fs::write(&plan, "[[entries]\nname =").unwrap();

        buildpack(&temp)
            .arg("build")
            .arg("--plan")
            .arg(&plan)
            .arg("--layers")
            .arg(temp.path().join("layers"))
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid build plan"));
    }

    #[test]
    fn retrieve_uses_configured_key_ring() {
        let temp = TempDir::new().unwrap();
        let key = temp.path().join("configured.asc");
        fs::write(&key, "not a public key").unwrap();
        fs::write(
            temp.path().join("config.toml"),
            format!("[signing]\nkeyring = {:?}\n", key.display().to_string()),
        )
        .unwrap();

        buildpack(&temp)
            .args(["retrieve", "--version", "2.4.4"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid trusted key ring"))
            .stderr(predicate::str::contains("embedded").not())
            .stderr(predicate::str::contains("Hint:"));
    }

    #[test]
    fn retrieve_rejects_invalid_key_ring() {
        let temp = TempDir::new().unwrap();
        let key = temp.path().join("bad.asc");
        fs::write(&key, "not a public key").unwrap();

        buildpack(&temp)
            .args(["retrieve", "--version", "2.4.4", "--key"])
            .arg(&key)
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid trusted key ring"));
    }

    #[test]
    fn invalid_config_is_reported() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("config.toml"), "[build\nstack =").unwrap();

        buildpack(&temp)
            .args(["catalog", "list"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid configuration"));
    }
}
