use assert_cmd::Command;

fn network_available() -> bool {
    let config = ureq::Agent::config_builder()
        .timeout_connect(Some(std::time::Duration::from_secs(2)))
        .timeout_global(Some(std::time::Duration::from_secs(5)))
        .build();
    let agent = ureq::Agent::new_with_config(config);
    agent
        .get("https://example.com/")
        .call()
        .map(|res| !res.status().is_server_error())
        .unwrap_or(false)
}

#[test]
fn fetch_prints_cleaned_page_text() -> Result<(), Box<dyn std::error::Error>> {
    if !network_available() {
        eprintln!("skipping fetch_prints_cleaned_page_text: network unavailable");
        return Ok(());
    }
    let mut cmd = Command::cargo_bin("caribcal")?;
    cmd.env("NO_COLOR", "1");
    let output = cmd.arg("fetch").arg("https://example.com/").output()?;
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.contains("Example Domain"), "stdout=\n{stdout}");
    assert!(!stdout.contains("<html"), "markup should be stripped. stdout=\n{stdout}");
    assert!(!stdout.contains("<style"), "stdout=\n{stdout}");
    Ok(())
}

#[test]
fn fetch_unreachable_host_fails_with_sentinel() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("caribcal")?;
    cmd.env("NO_COLOR", "1");
    let output = cmd
        .args(["--fetch-timeout", "2", "fetch", "http://127.0.0.1:9/"])
        .output()?;
    assert!(!output.status.success());
    let stderr = String::from_utf8(strip_ansi_escapes::strip(output.stderr))?;
    assert!(stderr.contains("[ERROR fetching http://127.0.0.1:9/"), "stderr=\n{stderr}");
    Ok(())
}
