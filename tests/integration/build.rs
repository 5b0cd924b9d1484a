//! Catalog building through the CLI.

use crate::common::TestProject;
use anyhow::Result;
use predicates::prelude::*;

#[test]
fn test_build_with_yaml_manifest() -> Result<()> {
    let project = TestProject::with_standard_samples()?;

    let catalog = project.build_json(&["--manifest", "manifest.yml", "--date", "2024-03-06"])?;

    let categories = catalog["categories"].as_array().unwrap();
    assert_eq!(categories.len(), 2);
    assert_eq!(categories[0]["title"], "Basics");
    assert_eq!(categories[1]["title"], "Algorithms");

    let sort = &categories[1]["samples"][0];
    assert_eq!(sort["name"], "algorithms/sort");
    assert_eq!(sort["min_spec"], "c++11");
    assert_eq!(sort["primary_spec"], "c++20");
    assert_eq!(sort["variants"]["c++11"]["title"], "Sort a range");
    assert_eq!(sort["variants"]["c++11"]["tags"], serde_json::json!(["c++11", "algorithms"]));
    assert_eq!(sort["variants"]["c++20"]["code"], "std::ranges::sort(v);\n");
    assert_eq!(sort["variants"]["c++20"]["intent"], "Demonstrates [1].\n");
    assert_eq!(sort["variants"]["c++20"]["description"], "Longer explanation.\n");

    let swap = &categories[0]["samples"][0];
    assert_eq!(swap["primary_spec"], "c++98");

    assert!(catalog["featured"].is_object());
    Ok(())
}

#[test]
fn test_build_with_toml_manifest_from_config() -> Result<()> {
    let project = TestProject::new()?;
    cppsamples_cli::test_utils::write_standard_samples(&project.path().join("samples"))?;
    project.write_file(
        "catalog.toml",
        "[[categories]]\ntitle = \"Sorting\"\nsamples = [\"algorithms/sort\"]\n",
    )?;
    project.write_config("samples_dir = \"samples\"\nmanifest = \"catalog.toml\"\n")?;

    let catalog = project.build_json(&[])?;

    assert_eq!(catalog["categories"][0]["title"], "Sorting");
    assert_eq!(catalog["categories"][0]["samples"][0]["name"], "algorithms/sort");
    assert_eq!(catalog["featured"]["name"], "algorithms/sort");
    Ok(())
}

#[test]
fn test_build_discovers_categories_without_manifest() -> Result<()> {
    let project = TestProject::new()?;
    project.write_file("_samples/01-basics/TITLE", "Basics\n")?;
    project.write_file("_samples/01-basics/01-swap.cpp", "// Swap values\n\nstd::swap(a, b);\n")?;
    project.write_file("_samples/02-algorithms/TITLE", "Algorithms\n")?;
    project.write_file(
        "_samples/02-algorithms/sort.cpp",
        "// Sort\n// c++11\nstd::sort(b, e);\n",
    )?;
    project.write_file(
        "_samples/02-algorithms/sort.c++20.cpp",
        "// Sort\nstd::ranges::sort(r);\n",
    )?;

    let catalog = project.build_json(&[])?;

    let categories = catalog["categories"].as_array().unwrap();
    assert_eq!(categories.len(), 2);
    assert_eq!(categories[0]["title"], "Basics");
    assert_eq!(categories[0]["samples"][0]["name"], "01-basics/01-swap");
    assert_eq!(categories[0]["samples"][0]["path"], "basics/swap");
    assert_eq!(categories[1]["samples"][0]["name"], "02-algorithms/sort");
    assert_eq!(categories[1]["samples"][0]["primary_spec"], "c++20");
    Ok(())
}

#[test]
fn test_build_writes_output_file() -> Result<()> {
    let project = TestProject::with_standard_samples()?;

    project
        .cmd()
        .args(["build", "--manifest", "manifest.yml", "--output", "catalog.json"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Wrote 2 samples in 2 categories"));

    let written = std::fs::read_to_string(project.path().join("catalog.json"))?;
    let catalog: serde_json::Value = serde_json::from_str(&written)?;
    assert_eq!(catalog["categories"].as_array().unwrap().len(), 2);
    Ok(())
}

#[test]
fn test_empty_catalog_has_no_featured_sample() -> Result<()> {
    let project = TestProject::new()?;
    project.write_file("empty.yml", "categories: []\n")?;

    let catalog = project.build_json(&["--manifest", "empty.yml"])?;
    assert_eq!(catalog["categories"], serde_json::json!([]));
    assert!(catalog["featured"].is_null());
    Ok(())
}
