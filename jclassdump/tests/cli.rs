//! Smoke-tests the `jclassdump` binary end to end: writes a hand-assembled
//! `.class` file to a temp directory and checks the rendered output, rather
//! than exercising any library function directly.

use std::io::Write;
use std::process::Command;

const MAGIC: u32 = 0xCAFE_BABE;

fn utf8_entry(out: &mut Vec<u8>, s: &str) {
    out.push(1);
    out.extend_from_slice(&(s.len() as u16).to_be_bytes());
    out.extend_from_slice(s.as_bytes());
}

fn class_entry(out: &mut Vec<u8>, name_index: u16) {
    out.push(7);
    out.extend_from_slice(&name_index.to_be_bytes());
}

/// `public class Greeter extends java.lang.Object { public static void main() { return; } }`
fn sample_class_bytes() -> Vec<u8> {
    let mut pool = Vec::new();
    utf8_entry(&mut pool, "Greeter"); // #1
    class_entry(&mut pool, 1); // #2
    utf8_entry(&mut pool, "java/lang/Object"); // #3
    class_entry(&mut pool, 3); // #4
    utf8_entry(&mut pool, "main"); // #5
    utf8_entry(&mut pool, "()V"); // #6
    utf8_entry(&mut pool, "Greeter.java"); // #7
    utf8_entry(&mut pool, "SourceFile"); // #8

    let mut data = Vec::new();
    data.extend_from_slice(&MAGIC.to_be_bytes());
    data.extend_from_slice(&[0, 0]);
    data.extend_from_slice(&[0, 52]); // Java 8
    data.extend_from_slice(&9u16.to_be_bytes()); // constant_pool_count
    data.extend_from_slice(&pool);
    data.extend_from_slice(&[0, 0x21]); // ACC_PUBLIC | ACC_SUPER
    data.extend_from_slice(&2u16.to_be_bytes()); // this_class
    data.extend_from_slice(&4u16.to_be_bytes()); // super_class
    data.extend_from_slice(&[0, 0]); // interfaces_count
    data.extend_from_slice(&[0, 0]); // fields_count
    data.extend_from_slice(&[0, 1]); // methods_count
    data.extend_from_slice(&[0x00, 0x09]); // ACC_PUBLIC | ACC_STATIC
    data.extend_from_slice(&5u16.to_be_bytes()); // name_index -> "main"
    data.extend_from_slice(&6u16.to_be_bytes()); // descriptor_index -> "()V"
    data.extend_from_slice(&[0, 0]); // method attributes_count
    data.extend_from_slice(&[0, 1]); // class attributes_count
    data.extend_from_slice(&8u16.to_be_bytes()); // SourceFile name_index
    data.extend_from_slice(&2u32.to_be_bytes()); // attribute_length
    data.extend_from_slice(&7u16.to_be_bytes()); // sourcefile_index
    data
}

fn write_sample_class() -> std::path::PathBuf {
    let mut path = std::env::temp_dir();
    path.push(format!("jclassdump-cli-test-{}.class", std::process::id()));
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(&sample_class_bytes()).unwrap();
    path
}

#[test]
fn dumps_a_minimal_class_file() {
    let path = write_sample_class();
    let output = Command::new(env!("CARGO_BIN_EXE_jclassdump"))
        .arg(&path)
        .output()
        .expect("failed to run jclassdump");
    std::fs::remove_file(&path).ok();

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("Compiled from \"Greeter.java\""));
    assert!(stdout.contains("class Greeter"));
    assert!(stdout.contains("main"));
}

#[test]
fn rejects_a_file_with_bad_magic() {
    let mut path = std::env::temp_dir();
    path.push(format!("jclassdump-cli-test-bad-{}.class", std::process::id()));
    std::fs::write(&path, [0u8, 0, 0, 0]).unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_jclassdump"))
        .arg(&path)
        .output()
        .expect("failed to run jclassdump");
    std::fs::remove_file(&path).ok();

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid magic"));
}

#[test]
fn rejects_a_non_class_extension() {
    let mut path = std::env::temp_dir();
    path.push(format!("jclassdump-cli-test-{}.txt", std::process::id()));
    std::fs::write(&path, b"not a class file").unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_jclassdump"))
        .arg(&path)
        .output()
        .expect("failed to run jclassdump");
    std::fs::remove_file(&path).ok();

    assert!(!output.status.success());
}
