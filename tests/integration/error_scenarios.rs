//! Failures abort the build with a readable message and exit status 1.

use crate::common::TestProject;
use anyhow::Result;
use cppsamples_cli::test_utils::{ManifestFixture, SampleFixture};
use predicates::prelude::*;

#[test]
fn test_malformed_sample_names_file() -> Result<()> {
    let project = TestProject::new()?;
    project.add_sample(&SampleFixture::malformed())?;
    project.write_file(
        "manifest.yml",
        "categories:\n  - title: A\n    samples: [algorithms/broken]\n",
    )?;

    project
        .cmd()
        .args(["build", "--manifest", "manifest.yml"])
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Malformed sample"))
        .stderr(predicate::str::contains("broken.cpp"));
    Ok(())
}

#[test]
fn test_duplicate_spec_is_reported() -> Result<()> {
    let project = TestProject::new()?;
    project.write_file("_samples/basics/hello.cpp", "// Hello\n// c++11\nint main() {}\n")?;
    project.write_file("_samples/basics/hello.c++11.cpp", "// Hello\nint main() {}\n")?;
    project.write_file("manifest.yml", "categories:\n  - title: A\n    samples: [basics/hello]\n")?;

    project
        .cmd()
        .args(["build", "--manifest", "manifest.yml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("more than one variant for c++11"))
        .stderr(predicate::str::contains("hello.c++11.cpp"));
    Ok(())
}

#[test]
fn test_unknown_spec_is_reported() -> Result<()> {
    let project = TestProject::new()?;
    project.write_file("_samples/basics/hello.c++42.cpp", "// Hello\nint main() {}\n")?;
    project.write_file("manifest.yml", "categories:\n  - title: A\n    samples: [basics/hello]\n")?;

    project
        .cmd()
        .args(["build", "--manifest", "manifest.yml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown spec label 'c++42'"));
    Ok(())
}

#[test]
fn test_missing_sample_is_reported() -> Result<()> {
    let project = TestProject::new()?;
    project.write_file("manifest.yml", "categories:\n  - title: A\n    samples: [basics/ghost]\n")?;

    project
        .cmd()
        .args(["build", "--manifest", "manifest.yml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Sample 'basics/ghost' not found"));
    Ok(())
}

#[test]
fn test_sample_listed_twice_is_rejected() -> Result<()> {
    let project = TestProject::with_standard_samples()?;
    ManifestFixture::duplicate_sample().write_to(project.path())?;

    project
        .cmd()
        .args(["build", "--manifest", "manifest.yml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Manifest validation failed"));
    Ok(())
}

#[test]
fn test_invalid_config_is_reported() -> Result<()> {
    let project = TestProject::with_standard_samples()?;
    project.write_config("environment = \"staging\"\n")?;

    project.cmd().arg("build").assert().failure().code(1);
    Ok(())
}

#[test]
fn test_invalid_date_is_rejected_by_parser() -> Result<()> {
    let project = TestProject::with_standard_samples()?;

    project
        .cmd()
        .args(["build", "--date", "March 6"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("YYYY-MM-DD"));
    Ok(())
}
