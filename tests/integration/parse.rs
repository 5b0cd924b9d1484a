//! The `parse` command.

use crate::common::TestProject;
use anyhow::Result;
use predicates::prelude::*;

const SAMPLE: &str = "\
// Range-based for loops
// c++11, loops

#include <vector>

int main()
{
  std::vector<int> v = {1, 2, 3};
  for (int x : v) {}
}

// Iterate over [!7] with a range-based for loop [8].
//
// Works with any type that has `begin` and `end`.
";

#[test]
fn test_parse_prints_record() -> Result<()> {
    let project = TestProject::new()?;
    let file = project.write_file("_samples/loops/range-for.cpp", SAMPLE)?;

    let output = project.cmd().arg("parse").arg(&file).output()?;
    assert!(output.status.success());

    let record: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(record["title"], "Range-based for loops");
    assert_eq!(record["tags"], serde_json::json!(["c++11", "loops"]));
    assert_eq!(record["code_offset"], 3);
    assert_eq!(record["intent"], "Iterate over [!7] with a range-based for loop [8].\n");
    assert_eq!(record["description"], "Works with any type that has `begin` and `end`.\n");
    assert!(record["code"].as_str().unwrap().starts_with("#include <vector>\n"));
    Ok(())
}

#[test]
fn test_parse_translates_line_refs() -> Result<()> {
    let project = TestProject::new()?;
    let file = project.write_file("_samples/loops/range-for.cpp", SAMPLE)?;

    let output = project.cmd().args(["parse", "--translate-refs"]).arg(&file).output()?;
    assert!(output.status.success());

    let record: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(record["intent"], "Iterate over [!4] with a range-based for loop [5].\n");
    Ok(())
}

#[test]
fn test_parse_malformed_file_fails() -> Result<()> {
    let project = TestProject::new()?;
    let file = project.write_file("_samples/bad.cpp", "int main() {}\n")?;

    project
        .cmd()
        .arg("parse")
        .arg(&file)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Malformed sample"))
        .stderr(predicate::str::contains("bad.cpp"));
    Ok(())
}

#[test]
fn test_parse_missing_file_fails() -> Result<()> {
    let project = TestProject::new()?;

    project
        .cmd()
        .args(["parse", "_samples/nope.cpp"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nope.cpp"));
    Ok(())
}

#[test]
fn test_parse_expands_reference_links() -> Result<()> {
    let project = TestProject::new()?;
    let file = project.write_file(
        "_samples/algorithms/sort.cpp",
        "// Sort a range\n\nstd::sort(v.begin(), v.end());\n\n\
         // Sort with [`std::sort`](cpp/algorithm/sort) [1].\n",
    )?;

    let output = project
        .cmd()
        .args(["parse", "--translate-refs", "--expand-links"])
        .arg(&file)
        .output()?;
    assert!(output.status.success());

    let record: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(
        record["intent"],
        "Sort with [`std::sort`](https://en.cppreference.com/w/cpp/algorithm/sort) [1].\n"
    );
    Ok(())
}
