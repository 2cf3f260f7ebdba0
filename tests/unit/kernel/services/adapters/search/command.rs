use super::*;
use crate::kernel::query::normalize;
use std::ffi::OsString;

fn strings(args: Vec<OsString>) -> Vec<String> {
    args.into_iter()
        .map(|a| a.to_string_lossy().into_owned())
        .collect()
}

#[test]
fn test_literal_args() {
    let cmd = SearchCommand::new("rg", "/root/ws", false);
    let args = strings(cmd.args(&normalize("foo")));
    assert_eq!(
        args,
        vec![
            "--no-config",
            "--line-number",
            "--with-filename",
            "--no-heading",
            "--color",
            "never",
            "--smart-case",
            "--fixed-strings",
            "--",
            "foo",
            "/root/ws",
        ]
    );
}

#[test]
fn test_regex_args_omit_fixed_strings() {
    let cmd = SearchCommand::new("rg", "/root/ws", false);
    let args = strings(cmd.args(&normalize("/f.o")));
    assert!(!args.iter().any(|a| a == "--fixed-strings"));
    assert!(args.iter().any(|a| a == "--smart-case"));
    assert_eq!(&args[args.len() - 3..], ["--", "f.o", "/root/ws"]);
}

#[test]
fn test_hidden_flag_goes_before_end_of_options() {
    let cmd = SearchCommand::new("rg", "/root/ws", true);
    let args = strings(cmd.args(&normalize("foo")));
    let hidden = args.iter().position(|a| a == "--hidden").unwrap();
    let end = args.iter().position(|a| a == "--").unwrap();
    assert!(hidden < end);
}

#[test]
fn test_dash_pattern_comes_after_end_of_options() {
    let cmd = SearchCommand::new("rg", "/root/ws", false);
    let args = strings(cmd.args(&normalize("-v")));
    let end = args.iter().position(|a| a == "--").unwrap();
    assert_eq!(args[end + 1], "-v");
    assert_eq!(args[end + 2], "/root/ws");
    assert_eq!(args.len(), end + 3);
}

#[test]
fn test_accessors() {
    let cmd = SearchCommand::new("/usr/bin/rg", "/root/ws", false);
    assert_eq!(cmd.program(), "/usr/bin/rg");
    assert_eq!(cmd.root(), std::path::Path::new("/root/ws"));
}
