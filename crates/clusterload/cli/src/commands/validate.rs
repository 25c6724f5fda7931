//! `clusterload validate`

use crate::error::CliResult;
use clap::Args;
use clusterload_types::TestConfig;
use std::path::PathBuf;

/// Arguments of the `validate` command
#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// Test config file
    #[arg(long)]
    pub testconfig: PathBuf,
}

pub fn execute(args: ValidateArgs) -> CliResult<()> {
    let test = TestConfig::load(&args.testconfig)?;
    println!("{}", describe(&test));
    Ok(())
}

fn describe(test: &TestConfig) -> String {
    let phases: usize = test.steps.iter().map(|s| s.phases.len()).sum();
    let measurements: usize = test.steps.iter().map(|s| s.measurements.len()).sum();
    let tuning_sets: Vec<&str> = test.tuning_sets.iter().map(|t| t.name.as_str()).collect();

    format!(
        "Test {} is valid\n  Automanaged namespaces: {}\n  Steps: {} ({} phases, {} measurements)\n  Tuning sets: {}",
        test.name,
        test.automanaged_namespaces,
        test.steps.len(),
        phases,
        measurements,
        tuning_sets.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CliError;

    #[test]
    fn test_describe() {
        let test = TestConfig::from_yaml_str(
            "name: density\nautomanagedNamespaces: 3\ntuningSets:\n  - name: Uniform\n    qpsLoad:\n      qps: 5\nsteps:\n  - measurements:\n      - method: Sleep\n        identifier: pause\n        params:\n          durationMs: 10\n",
        )
        .unwrap();

        let text = describe(&test);
        assert!(text.contains("Test density is valid"));
        assert!(text.contains("Steps: 1 (0 phases, 1 measurements)"));
        assert!(text.contains("Tuning sets: Uniform"));
    }

    #[test]
    fn test_demo_config_is_valid() {
        let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../../demos/density/config.yaml");
        let test = TestConfig::load(&path).unwrap();
        assert_eq!(test.name, "density");
        assert!(describe(&test).contains("Tuning sets: Uniform, Parallel"));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "name: \"\"\n").unwrap();

        let err = execute(ValidateArgs { testconfig: path }).unwrap_err();
        assert!(matches!(err, CliError::TestConfig(_)));
    }
}
