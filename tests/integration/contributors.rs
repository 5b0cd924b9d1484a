//! Contributor attribution from git history.

use crate::common::TestProject;
use anyhow::Result;
use cppsamples_cli::test_utils::TestGit;
use mockito::Matcher;
use predicates::prelude::*;

/// Project whose swap sample was written by Ann and later edited by Bob.
fn project_with_history() -> Result<TestProject> {
    let project = TestProject::with_standard_samples()?;
    let git = TestGit::new(project.path());
    git.init()?;
    git.config_user()?;
    git.add_all()?;
    git.commit_as("Ann Author", "ann@example.com", "Add samples")?;

    project.write_file(
        "_samples/basics/swap.cpp",
        "// Swap values\n\nstd::swap(a, b);\nusing std::swap;\n",
    )?;
    git.add_all()?;
    git.commit_as("Bob Builder", "bob@example.com", "Tweak swap")?;
    Ok(project)
}

fn identity_config(api_base: &str) -> String {
    format!(
        "manifest = \"manifest.yml\"\n\n\
         [identity]\napi_base = \"{api_base}\"\ncache_path = \"cache/identities.json\"\n"
    )
}

fn user_json(login: &str, avatar: &str) -> String {
    serde_json::json!({
        "login": login,
        "avatar_url": avatar,
        "html_url": format!("https://github.example/{login}"),
    })
    .to_string()
}

fn search_json(login: &str, avatar: &str) -> String {
    format!(r#"{{"total_count":1,"items":[{}]}}"#, user_json(login, avatar))
}

#[test]
fn test_development_build_uses_placeholder_avatars() -> Result<()> {
    let project = project_with_history()?;

    let catalog = project.build_json(&["--manifest", "manifest.yml", "--date", "2024-03-06"])?;

    let swap = &catalog["categories"][0]["samples"][0]["variants"]["c++98"];
    let contributors = swap["contributors"].as_array().unwrap();
    assert_eq!(contributors.len(), 2);
    assert_eq!(contributors[0]["display_name"], "Bob Builder");
    assert_eq!(contributors[1]["display_name"], "Ann Author");
    for contributor in contributors {
        assert_eq!(contributor["avatar_url"], "/images/unknown_user.png");
        assert!(contributor["profile_url"].is_null());
    }
    assert!(swap["last_modified"].is_string());

    let sort = &catalog["categories"][1]["samples"][0]["variants"]["c++20"];
    let sort_authors = sort["contributors"].as_array().unwrap();
    assert_eq!(sort_authors.len(), 1);
    assert_eq!(sort_authors[0]["display_name"], "Ann Author");
    Ok(())
}

#[test]
fn test_samples_outside_git_have_no_contributors() -> Result<()> {
    let project = TestProject::with_standard_samples()?;

    let catalog = project.build_json(&["--manifest", "manifest.yml"])?;

    let swap = &catalog["categories"][0]["samples"][0]["variants"]["c++98"];
    assert_eq!(swap["contributors"], serde_json::json!([]));
    assert!(swap["last_modified"].is_null());
    Ok(())
}

#[test]
fn test_production_build_resolves_and_caches_identities() -> Result<()> {
    let project = project_with_history()?;
    let mut server = mockito::Server::new();

    let annie = server
        .mock("GET", "/users/annie")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(user_json("annie", "https://avatars.example/u/1"))
        .expect(1)
        .create();
    let bob = server
        .mock("GET", "/search/users")
        .match_query(Matcher::UrlEncoded("q".into(), "bob@example.com in:email".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(search_json("bobb", "https://avatars.example/u/2?v=4"))
        .expect(1)
        .create();

    project.write_file("CONTRIBUTORS.md", "# Contributors\n\n- Ann Author (annie)\n")?;
    project.write_config(&format!(
        "roster = \"CONTRIBUTORS.md\"\nenvironment = \"production\"\n{}",
        identity_config(&server.url())
    ))?;

    let catalog = project.build_json(&["--date", "2024-03-06"])?;

    let swap = &catalog["categories"][0]["samples"][0]["variants"]["c++98"];
    let contributors = swap["contributors"].as_array().unwrap();
    assert_eq!(contributors[0]["display_name"], "Bob Builder");
    assert_eq!(contributors[0]["avatar_url"], "https://avatars.example/u/2?v=4&size=36");
    assert_eq!(contributors[0]["profile_url"], "https://github.example/bobb");
    assert_eq!(contributors[1]["avatar_url"], "https://avatars.example/u/1?size=36");
    assert!(project.path().join("cache/identities.json").exists());

    // The second build is served entirely from the persisted cache.
    let again = project.build_json(&["--date", "2024-03-06"])?;
    assert_eq!(again, catalog);

    annie.assert();
    bob.assert();

    project
        .cmd()
        .args(["cache", "info"])
        .assert()
        .success()
        .stdout(predicate::str::contains("identities.json"))
        .stdout(predicate::str::contains("Entries:"));
    project
        .cmd()
        .args(["cache", "clear"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed identity cache"));
    assert!(!project.path().join("cache/identities.json").exists());
    Ok(())
}

#[test]
fn test_production_build_falls_back_when_identity_is_unknown() -> Result<()> {
    let project = project_with_history()?;
    let mut server = mockito::Server::new();

    let _search = server
        .mock("GET", "/search/users")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"total_count":0,"items":[]}"#)
        .create();

    project.write_config(&identity_config(&server.url()))?;

    let catalog = project.build_json(&["--production", "--date", "2024-03-06"])?;

    let swap = &catalog["categories"][0]["samples"][0]["variants"]["c++98"];
    for contributor in swap["contributors"].as_array().unwrap() {
        assert_eq!(contributor["avatar_url"], "/images/unknown_user.png");
    }
    Ok(())
}

#[test]
fn test_dated_production_build_waits_out_rate_limit() -> Result<()> {
    let project = TestProject::with_standard_samples()?;
    let git = TestGit::new(project.path());
    git.init()?;
    git.config_user()?;
    git.add_all()?;
    git.commit_as("Ann Author", "ann@example.com", "Add samples")?;

    let mut server = mockito::Server::new();
    let reset = chrono::Utc::now().timestamp() + 2;
    let throttled = server
        .mock("GET", "/search/users")
        .match_query(Matcher::Any)
        .with_status(403)
        .with_header("x-ratelimit-remaining", "0")
        .with_header("x-ratelimit-reset", &reset.to_string())
        .with_body(r#"{"message":"API rate limit exceeded"}"#)
        .expect(1)
        .create();
    let found = server
        .mock("GET", "/search/users")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(search_json("annie", "https://avatars.example/u/1"))
        .expect(1)
        .create();
    project.write_config(&identity_config(&server.url()))?;

    // The build date is years before the reset; the wait must still end.
    let output = project
        .cmd()
        .args(["build", "--production", "--date", "2024-03-06"])
        .timeout(std::time::Duration::from_secs(60))
        .output()?;
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let catalog: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    let swap = &catalog["categories"][0]["samples"][0]["variants"]["c++98"];
    assert_eq!(swap["contributors"][0]["avatar_url"], "https://avatars.example/u/1?size=36");

    throttled.assert();
    found.assert();
    Ok(())
}

#[test]
fn test_forbidden_lookup_falls_back_to_placeholder() -> Result<()> {
    let project = project_with_history()?;
    let mut server = mockito::Server::new();

    // Not a rate limit: quota remains, so the lookup gives up after its attempts.
    let forbidden = server
        .mock("GET", "/search/users")
        .match_query(Matcher::Any)
        .with_status(403)
        .with_header("x-ratelimit-remaining", "59")
        .with_body(r#"{"message":"Resource protected by organization SAML enforcement"}"#)
        .expect(12)
        .create();
    project.write_config(&identity_config(&server.url()))?;

    let output = project
        .cmd()
        .args(["build", "--production", "--date", "2024-03-06"])
        .timeout(std::time::Duration::from_secs(60))
        .output()?;
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let catalog: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    let swap = &catalog["categories"][0]["samples"][0]["variants"]["c++98"];
    for contributor in swap["contributors"].as_array().unwrap() {
        assert_eq!(contributor["avatar_url"], "/images/unknown_user.png");
    }
    forbidden.assert();
    Ok(())
}
