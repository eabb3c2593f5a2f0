mod common;

use fvm::assembler::{
    self,
    phases::{generate, resolve, tokenize},
    Errors, Loc, Located,
};
use fvm::spec::types::hw;
use std::process::Command;

#[test]
fn registers_by_number() {
    assert_eq!(
        common::assemble("pl [5]d 3\npl [2]d 4\na+"),
        vec![0, 5, 3, 0, 2, 4, 7]
    );
}

#[test]
fn registers_by_name() {
    assert_eq!(
        common::assemble("pl [5]d acc pl [2]d dat a+ fi"),
        vec![0, 5, 3, 0, 2, 4, 7, 27]
    );
}

#[test]
fn forward_reference() {
    assert_eq!(
        common::assemble("jm loop\n[1]d [2]d\nloop: fi"),
        vec![4, 4, 1, 2, 27]
    );
}

#[test]
fn address_accounting() {
    // `here` follows three string words and a zero-width definition.
    assert_eq!(
        common::assemble("[abc]s mark: here: jm here"),
        vec![97, 98, 99, 4, 3]
    );
}

#[test]
fn comments_and_whitespace() {
    let src = "; leading comment\n\tpl\t[1]d   acc;trailing\n\n   fi ; done";
    assert_eq!(common::assemble(src), vec![0, 1, 3, 27]);
}

#[test]
fn literal_radices() {
    assert_eq!(
        common::assemble("[1010]b [17]o [99]d [fF]x [1'0]d"),
        vec![10, 15, 99, 255, 10]
    );
}

#[test]
fn literal_without_opening_bracket() {
    assert_eq!(common::assemble("pl 12]d acc fi"), vec![0, 12, 3, 27]);
}

#[test]
fn invalid_utf8_is_an_assembly_error() {
    let errs = assembler::assemble_raw(b"fi\n[caf\xE9]s jm nowhere").unwrap_err();

    let mut expected = Errors::new();
    expected.push(Located::with_loc(
        Loc::new(2, 5),
        tokenize::Error::InvalidEncoding(0xE9),
    ));
    expected.push(Located::with_loc(
        Loc::new(2, 12),
        generate::Error::UnknownLabel("nowhere".to_owned()),
    ));
    assert_eq!(errs, expected);

    assert_eq!(assembler::assemble_raw(b"pl [5]d acc"), Ok(vec![0, 5, 3]));
}

#[test]
fn string_escapes() {
    assert_eq!(
        common::assemble(r"[a\/b\n\r\b\]]s"),
        vec![97, 92, 98, 10, 13, 8, 93]
    );
}

#[test]
fn undefined_label() {
    let mut expected = Errors::new();
    expected.push(Located::with_loc(
        Loc::new(1, 4),
        generate::Error::UnknownLabel("nowhere".to_owned()),
    ));

    assert_eq!(assembler::assemble("jm nowhere fi"), Err(expected));
}

#[test]
fn errors_from_every_phase_are_reported_in_order() {
    let errs = assembler::assemble("bad-name: [1z]x\n[3]q jm missing").unwrap_err();

    let mut expected = Errors::new();
    expected.push(Located::with_loc(
        Loc::new(1, 1),
        resolve::Error::IllegalLabelCharacter("bad-name".to_owned(), '-'),
    ));
    expected.push(Located::with_loc(
        Loc::new(1, 11),
        generate::Error::InvalidLiteral(
            "[1z]x".to_owned(),
            assembler::literal::Error::InvalidDigit('z'),
        ),
    ));
    expected.push(Located::with_loc(
        Loc::new(2, 1),
        tokenize::Error::UnrecognizedSpecifier("[3]q".to_owned(), 'q'),
    ));
    expected.push(Located::with_loc(
        Loc::new(2, 9),
        generate::Error::UnknownLabel("missing".to_owned()),
    ));
    assert_eq!(errs, expected);

    let msg = errs.to_string();
    assert_eq!(msg.lines().count(), 4);
    assert!(msg.starts_with("Assembly Error (in Resolver) @(line: 1, col: 1): "));
}

#[test]
fn value_label_errors() {
    let errs = assembler::assemble("greeting= [hi]s fi").unwrap_err();
    assert_eq!(errs.len(), 1);
    assert!(errs.to_string().contains("greeting"));

    assert!(assembler::assemble("fi dangling=").is_err());
}

#[test]
fn unterminated_literal() {
    let errs = assembler::assemble("pl [12 acc").unwrap_err();
    let mut expected = Errors::new();
    expected.push(Located::with_loc(
        Loc::new(1, 4),
        tokenize::Error::UnterminatedLiteral("[12 acc".to_owned()),
    ));
    assert_eq!(errs, expected);
}

#[test]
fn image_bytes() {
    assert_eq!(
        assembler::assemble_bytes("fi").unwrap(),
        hw::words_to_bytes(&[27])
    );
}

#[test]
fn cli_writes_image() {
    let dir = common::scratch_dir("asm-ok");
    let src = dir.join("prog.fa");
    let out = dir.join("prog.fb");
    std::fs::write(&src, "pl [5]d acc fi").unwrap();

    let status = Command::new(env!("CARGO_BIN_EXE_fvma"))
        .arg(&src)
        .arg(&out)
        .status()
        .unwrap();

    assert_eq!(status.code(), Some(0));
    assert_eq!(
        std::fs::read(&out).unwrap(),
        hw::words_to_bytes(&[0, 5, 3, 27])
    );
}

#[test]
fn cli_undefined_label_writes_nothing() {
    let dir = common::scratch_dir("asm-undefined");
    let src = dir.join("prog.fa");
    let out = dir.join("prog.fb");
    std::fs::write(&src, "jm nowhere fi").unwrap();

    let result = Command::new(env!("CARGO_BIN_EXE_fvma"))
        .arg(&src)
        .arg(&out)
        .output()
        .unwrap();

    assert_eq!(result.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&result.stderr).contains("nowhere"));
    assert!(!out.exists());
}

#[test]
fn cli_rejects_output_name() {
    let dir = common::scratch_dir("asm-badname");
    let src = dir.join("prog.fa");
    let out = dir.join("prog.bin");
    std::fs::write(&src, "fi").unwrap();

    let result = Command::new(env!("CARGO_BIN_EXE_fvma"))
        .arg(&src)
        .arg(&out)
        .output()
        .unwrap();

    assert_eq!(result.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&result.stderr).contains(".fb"));
    assert!(!out.exists());
}

#[test]
fn cli_invalid_utf8_writes_nothing() {
    let dir = common::scratch_dir("asm-encoding");
    let src = dir.join("prog.fa");
    let out = dir.join("prog.fb");
    std::fs::write(&src, b"[caf\xE9]s fi").unwrap();

    let result = Command::new(env!("CARGO_BIN_EXE_fvma"))
        .arg(&src)
        .arg(&out)
        .output()
        .unwrap();

    assert_eq!(result.status.code(), Some(0));
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("UTF-8"));
    assert!(stderr.contains("line: 1, col: 5"));
    assert!(!out.exists());
}

#[test]
fn cli_exit_codes() {
    let no_args = Command::new(env!("CARGO_BIN_EXE_fvma")).output().unwrap();
    assert_eq!(no_args.status.code(), Some(1));

    let dir = common::scratch_dir("asm-missing");
    let missing = Command::new(env!("CARGO_BIN_EXE_fvma"))
        .arg(dir.join("does-not-exist.fa"))
        .arg(dir.join("out.fb"))
        .output()
        .unwrap();
    assert_eq!(missing.status.code(), Some(2));
}
