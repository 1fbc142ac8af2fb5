use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

const DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn xmlsort() -> Result<Command, Box<dyn std::error::Error>> {
    Ok(Command::cargo_bin("xmlsort")?)
}

#[test]
fn test_sorts_to_stdout() -> TestResult {
    let dir = tempdir()?;
    let input = dir.path().join("in.xml");
    fs::write(&input, r#"<x a="1" b="2"/>"#)?;

    xmlsort()?
        .arg(&input)
        .args(["-p", "x:b,a"])
        .assert()
        .success()
        .stdout(format!("{DECLARATION}<x b=\"2\" a=\"1\"/>\n"));
    Ok(())
}

#[test]
fn test_missing_input_is_reported() -> TestResult {
    xmlsort()?
        .assert()
        .failure()
        .stderr(predicate::str::contains("no xml file to sort"));
    Ok(())
}

#[test]
fn test_positional_output_file() -> TestResult {
    let dir = tempdir()?;
    let input = dir.path().join("in.xml");
    let output = dir.path().join("out.xml");
    fs::write(&input, "<r><b/><a/></r>")?;

    xmlsort()?.arg(&input).arg(&output).assert().success().stdout("");
    assert_eq!(
        fs::read_to_string(&output)?,
        format!("{DECLARATION}<r>\n  <a/>\n  <b/>\n</r>\n")
    );
    Ok(())
}

#[test]
fn test_file_flag_makes_positional_the_output() -> TestResult {
    let dir = tempdir()?;
    let input = dir.path().join("in.xml");
    let output = dir.path().join("out.xml");
    fs::write(&input, "<r/>")?;

    xmlsort()?.arg("-f").arg(&input).arg(&output).assert().success();
    assert_eq!(fs::read_to_string(&output)?, format!("{DECLARATION}<r/>\n"));
    Ok(())
}

#[test]
fn test_inplace_rewrites_input() -> TestResult {
    let dir = tempdir()?;
    let input = dir.path().join("manifest.xml");
    fs::write(
        &input,
        r#"<manifest><project name="n" path="p"/><remote fetch=".." name="o"/></manifest>"#,
    )?;

    xmlsort()?.arg("-i").arg("--android").arg(&input).assert().success();
    assert_eq!(
        fs::read_to_string(&input)?,
        format!(
            "{DECLARATION}<manifest>\n  <project path=\"p\" name=\"n\"/>\n  <remote name=\"o\" fetch=\"..\"/>\n</manifest>\n"
        )
    );
    Ok(())
}

#[test]
fn test_inplace_with_output_warns() -> TestResult {
    let dir = tempdir()?;
    let input = dir.path().join("in.xml");
    let ignored = dir.path().join("ignored.xml");
    fs::write(&input, "<r/>")?;

    xmlsort()?
        .arg("-i")
        .arg(&input)
        .arg("-o")
        .arg(&ignored)
        .assert()
        .success()
        .stderr(predicate::str::contains("in place"));
    assert!(!ignored.exists());
    Ok(())
}

#[test]
fn test_flags_reach_the_sorter() -> TestResult {
    let dir = tempdir()?;
    let input = dir.path().join("in.xml");
    fs::write(
        &input,
        r#"<r><!-- drop --><b/><a k="v" v="v" id="1"/><!--@group(x)--><c/></r>"#,
    )?;

    xmlsort()?
        .arg(&input)
        .args(["-c", "-g", "-k", "-r", "a:id", "-x", "a:k=v"])
        .assert()
        .success()
        .stdout(format!(
            "{DECLARATION}<r>\n  <b/>\n  <a k=\"v\"/>\n\n  <!--@group(x)-->\n  <c/>\n</r>\n"
        ));
    Ok(())
}

#[test]
fn test_bad_pattern_fails_before_writing() -> TestResult {
    let dir = tempdir()?;
    let input = dir.path().join("in.xml");
    let output = dir.path().join("out.xml");
    fs::write(&input, "<r/>")?;

    xmlsort()?
        .arg(&input)
        .arg(&output)
        .args(["-x", "a:b"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid pattern"));
    assert!(!output.exists());
    Ok(())
}

#[test]
fn test_parse_error_fails() -> TestResult {
    let dir = tempdir()?;
    let input = dir.path().join("in.xml");
    fs::write(&input, "<r><a></r>")?;

    xmlsort()?
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("mismatched closing tag"));
    Ok(())
}

#[test]
fn test_unreadable_input_fails() -> TestResult {
    let dir = tempdir()?;
    xmlsort()?
        .arg(dir.path().join("missing.xml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read input file"));
    Ok(())
}

#[test]
fn test_max_depth_rejects_deep_input() -> TestResult {
    let dir = tempdir()?;
    let input = dir.path().join("deep.xml");
    fs::write(&input, "<a><b><c/></b></a>")?;

    xmlsort()?
        .arg(&input)
        .args(["--max-depth", "2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("max depth exceeded: 2"));
    xmlsort()?
        .arg(&input)
        .args(["--max-depth", "3"])
        .assert()
        .success();
    Ok(())
}
