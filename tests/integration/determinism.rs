//! Stable output for stable inputs.

use crate::common::TestProject;
use anyhow::Result;
use cppsamples_cli::test_utils::SampleFixture;

fn project_with_many_samples() -> Result<TestProject> {
    let project = TestProject::new()?;
    let mut manifest = String::from("categories:\n");
    for category in ["containers", "algorithms", "memory"] {
        manifest.push_str(&format!("  - title: {category}\n    samples:\n"));
        for n in 0..4 {
            let id = format!("{category}/sample-{n}");
            project.add_sample(&SampleFixture::new(
                &format!("{id}.cpp"),
                &format!("Sample {n} about {category}"),
                &["c++11"],
                "int main() {}\n",
            ))?;
            manifest.push_str(&format!("      - {id}\n"));
        }
    }
    project.write_file("manifest.yml", &manifest)?;
    Ok(project)
}

#[test]
fn test_same_week_gives_identical_output() -> Result<()> {
    let project = project_with_many_samples()?;

    let run = |date: &str| -> Result<Vec<u8>> {
        let output =
            project.cmd().args(["build", "--manifest", "manifest.yml", "--date", date]).output()?;
        anyhow::ensure!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
        Ok(output.stdout)
    };

    // Sunday and Saturday of the same Sunday-based week.
    let first = run("2024-03-03")?;
    let second = run("2024-03-03")?;
    let later_in_week = run("2024-03-09")?;

    assert_eq!(first, second);
    assert_eq!(first, later_in_week);
    Ok(())
}

#[test]
fn test_featured_sample_is_in_catalog() -> Result<()> {
    let project = project_with_many_samples()?;

    for date in ["2024-01-07", "2024-06-16", "2025-12-28"] {
        let catalog = project.build_json(&["--manifest", "manifest.yml", "--date", date])?;
        let featured = &catalog["featured"];
        let category = featured["category"].as_u64().unwrap() as usize;
        let sample = featured["sample"].as_u64().unwrap() as usize;
        assert_eq!(
            catalog["categories"][category]["samples"][sample]["name"],
            featured["name"],
            "featured position mismatch for {date}"
        );
    }
    Ok(())
}

#[test]
fn test_manifest_order_is_preserved() -> Result<()> {
    let project = project_with_many_samples()?;

    let catalog = project.build_json(&["--manifest", "manifest.yml", "--date", "2024-03-03"])?;
    let titles: Vec<&str> = catalog["categories"]
        .as_array()
        .unwrap()
        .iter()
        .map(|category| category["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["containers", "algorithms", "memory"]);

    let names: Vec<&str> = catalog["categories"][1]["samples"]
        .as_array()
        .unwrap()
        .iter()
        .map(|sample| sample["name"].as_str().unwrap())
        .collect();
    assert_eq!(
        names,
        vec![
            "algorithms/sample-0",
            "algorithms/sample-1",
            "algorithms/sample-2",
            "algorithms/sample-3"
        ]
    );
    Ok(())
}
