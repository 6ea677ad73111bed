use super::*;

#[cfg(unix)]
#[test]
fn successful_command_passes() {
    ShellRunner.run("true").unwrap();
}

#[cfg(unix)]
#[test]
fn failing_command_reports_stderr() {
    let err = ShellRunner.run("echo broken pipe >&2; exit 3").unwrap_err();
    let msg = err.to_string();
    assert!(matches!(err, ReviewError::Encode(_)));
    assert!(msg.contains("broken pipe"), "{msg}");
}

#[cfg(unix)]
#[test]
fn run_tool_returns_stdout() {
    let cmd = tool_command(&["echo".to_string(), "hello".to_string()]).unwrap();
    assert_eq!(run_tool(cmd, "echo").unwrap(), b"hello\n");
}

#[test]
fn empty_tool_invocation_is_rejected() {
    assert!(tool_command(&[]).is_err());
}

#[test]
fn dry_run_never_fails() {
    DryRunRunner.run("definitely-not-a-binary --flag").unwrap();
}
