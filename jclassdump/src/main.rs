//! `jclassdump`: a disassembler for the JVM class file format, in the
//! shape of `javap`.

mod disasm;
mod render;

use std::fs;
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use classfile_core::{ClassFile, ClassFormatError, ParseOptions};
use classfile_model::attribute::AttributeInfo;
use classfile_model::class_file::{FieldInfo, MethodInfo};
use classfile_model::descriptor::{parse_field_descriptor, parse_method_descriptor};
use classfile_model::flags::ClassAccessFlags;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(value_name = "CLASSES", required = true)]
    class_files: Vec<PathBuf>,

    /// Print line number and local variable tables
    #[arg(short, long)]
    line: bool,

    /// Show only public classes and members
    #[arg(long)]
    public: bool,

    /// Show protected/public classes and members
    #[arg(long)]
    protected: bool,

    /// Show package/protected/public classes and members (default)
    #[arg(long, default_value_t = true)]
    package: bool,

    /// Show all classes and members
    #[arg(long)]
    private: bool,

    /// Disassemble the code
    #[arg(short = 'c', long)]
    disassemble: bool,

    /// Print internal type signatures and descriptors instead of source types
    #[arg(short, long)]
    signatures: bool,

    /// Show system info (path, size) of the class being processed
    #[arg(long)]
    sysinfo: bool,

    /// Show static final field values
    #[arg(long)]
    constants: bool,

    /// Override `element_value` nesting depth limit
    #[arg(long)]
    max_annotation_depth: Option<u32>,

    /// Accept non-zero tableswitch/lookupswitch padding instead of rejecting it
    #[arg(long)]
    allow_switch_padding: bool,
}

fn main() {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let mut options = ParseOptions::default();
    if let Some(depth) = args.max_annotation_depth {
        options.max_annotation_depth = depth;
    }
    if args.allow_switch_padding {
        options.reject_switch_padding = false;
    }

    let mut exit_code = 0;
    for path in &args.class_files {
        if let Err(message) = dump_one(path, &args, &options) {
            eprintln!("jclassdump: {}: {message}", path.display());
            exit_code = 1;
        }
    }
    std::process::exit(exit_code);
}

fn dump_one(path: &PathBuf, args: &Args, options: &ParseOptions) -> Result<(), String> {
    if path.extension().map(|e| e != "class").unwrap_or(true) {
        return Err("not a .class file".to_string());
    }
    let bytes = fs::read(path).map_err(|e| e.to_string())?;

    if args.sysinfo {
        println!("{}: {} bytes", path.display(), bytes.len());
    }

    let class = classfile_core::parse_class_file(&bytes, options).map_err(|e: ClassFormatError| {
        tracing::error!(%e, "parse failed");
        e.to_string()
    })?;

    print!("{}", render_class(&class, args));
    Ok(())
}

fn render_class(class: &ClassFile, args: &Args) -> String {
    let mut out = String::new();

    for attribute in &class.attributes {
        if let AttributeInfo::SourceFile(sf) = attribute {
            if let Some(name) = render::utf8_at(class, sf.sourcefile_index) {
                out.push_str(&format!("Compiled from \"{name}\"\n"));
            }
        }
    }

    let this_name = render::class_name_at(class, class.this_class).unwrap_or_else(|| "<unknown>".to_string());
    let is_interface = class.access_flags.contains(ClassAccessFlags::ACC_INTERFACE);
    let mut header_words = render::class_flag_keywords(class.access_flags);
    header_words.push(if is_interface { "interface" } else { "class" });
    header_words.push(&this_name);

    let mut header = header_words.join(" ");
    if !is_interface {
        if let Some(super_name) = render::class_name_at(class, class.super_class) {
            if super_name != "java.lang.Object" {
                header.push_str(&format!(" extends {super_name}"));
            }
        }
    }
    if !class.interfaces.is_empty() {
        let names: Vec<String> = class
            .interfaces
            .iter()
            .filter_map(|&index| render::class_name_at(class, index))
            .collect();
        let keyword = if is_interface { "extends" } else { "implements" };
        header.push_str(&format!(" {keyword} {}", names.join(", ")));
    }
    out.push_str(&header);
    out.push_str(" {\n");

    for field in &class.fields {
        if !field_visible(field, args) {
            continue;
        }
        out.push_str(&render_field(class, field, args));
    }
    if !class.fields.is_empty() {
        out.push('\n');
    }

    for method in &class.methods {
        if !method_visible(method, args) {
            continue;
        }
        out.push_str(&render_method(class, method, args));
        out.push('\n');
    }

    out.push_str("}\n");
    out
}

fn field_visible(field: &FieldInfo, args: &Args) -> bool {
    use classfile_model::flags::FieldAccessFlags as F;
    render::passes_visibility_filter(
        field.access_flags.contains(F::ACC_PUBLIC),
        field.access_flags.contains(F::ACC_PROTECTED),
        field.access_flags.contains(F::ACC_PRIVATE),
        args.public,
        args.protected,
        args.package,
        args.private,
    )
}

fn method_visible(method: &MethodInfo, args: &Args) -> bool {
    use classfile_model::flags::MethodAccessFlags as M;
    render::passes_visibility_filter(
        method.access_flags.contains(M::ACC_PUBLIC),
        method.access_flags.contains(M::ACC_PROTECTED),
        method.access_flags.contains(M::ACC_PRIVATE),
        args.public,
        args.protected,
        args.package,
        args.private,
    )
}

fn render_field(class: &ClassFile, field: &FieldInfo, args: &Args) -> String {
    let name = render::utf8_at(class, field.name_index).unwrap_or("<unknown>");
    let descriptor = render::utf8_at(class, field.descriptor_index).unwrap_or("");
    let words = render::field_flag_keywords(field.access_flags);
    let type_name = if args.signatures {
        descriptor.to_string()
    } else {
        parse_field_descriptor(descriptor)
            .map(|ty| render::field_type_name(&ty))
            .unwrap_or_else(|_| descriptor.to_string())
    };

    let mut line = words.join(" ");
    if !line.is_empty() {
        line.push(' ');
    }
    line.push_str(&type_name);
    line.push(' ');
    line.push_str(name);

    if args.constants {
        if let Some(value) = constant_value(class, field) {
            line.push_str(" = ");
            line.push_str(&value);
        }
    }
    format!("    {line};\n")
}

fn constant_value(class: &ClassFile, field: &FieldInfo) -> Option<String> {
    use classfile_model::constant_pool::ConstantPoolEntry;
    for attribute in &field.attributes {
        if let AttributeInfo::ConstantValue(cv) = attribute {
            return match class.constant_pool.get(cv.constantvalue_index as usize)?.as_ref()? {
                ConstantPoolEntry::Integer(v) => Some(v.to_string()),
                ConstantPoolEntry::Float(v) => Some(v.to_string()),
                ConstantPoolEntry::Long(v) => Some(v.to_string()),
                ConstantPoolEntry::Double(v) => Some(v.to_string()),
                ConstantPoolEntry::String { string_index } => {
                    render::utf8_at(class, *string_index).map(|s| format!("{s:?}"))
                }
                _ => None,
            };
        }
    }
    None
}

fn render_method(class: &ClassFile, method: &MethodInfo, args: &Args) -> String {
    let raw_name = render::utf8_at(class, method.name_index).unwrap_or("<unknown>");
    let descriptor = render::utf8_at(class, method.descriptor_index).unwrap_or("");
    let words = render::method_flag_keywords(method.access_flags);

    let mut line = String::from("    ");
    line.push_str(&words.join(" "));
    if !words.is_empty() {
        line.push(' ');
    }

    if args.signatures {
        line.push_str(&format!("{raw_name}{descriptor}"));
        line.push(';');
        line.push('\n');
    } else if raw_name == "<clinit>" {
        line.push_str("{};");
        line.push('\n');
    } else {
        let parsed = parse_method_descriptor(descriptor);
        let (params, return_ty) = match &parsed {
            Ok(desc) => (render::parameter_list(desc), render::return_type_name(desc)),
            Err(_) => (String::new(), String::new()),
        };
        if raw_name == "<init>" {
            line.push_str(&format!(
                "{}({params})",
                render::class_name_at(class, class.this_class).unwrap_or_default()
            ));
        } else {
            line.push_str(&format!("{return_ty} {raw_name}({params})"));
        }
        line.push(';');
        line.push('\n');
    }

    if args.line {
        line.push_str(&render_line_numbers(method));
    }
    if args.disassemble {
        line.push_str(&render_disassembly(class, method));
    }
    line
}

fn render_line_numbers(method: &MethodInfo) -> String {
    let mut out = String::new();
    for attribute in &method.attributes {
        if let AttributeInfo::Code(code) = attribute {
            for inner in &code.attributes {
                if let AttributeInfo::LineNumberTable(table) = inner {
                    for entry in &table.0 {
                        out.push_str(&format!(
                            "      line {}: {}\n",
                            entry.line_number, entry.start_pc
                        ));
                    }
                }
            }
        }
    }
    out
}

fn render_disassembly(class: &ClassFile, method: &MethodInfo) -> String {
    let mut out = String::new();
    for attribute in &method.attributes {
        if let AttributeInfo::Code(code) = attribute {
            out.push_str("      Code:\n");
            for line in disasm::disassemble(&code.code) {
                out.push_str(&format!("        {}: {}", line.pc, line.text));
                if let Some(index) = pool_index_operand(&line.text) {
                    if let Some(comment) = disasm::resolve_comment(class, index) {
                        out.push_str(&format!(" {comment}"));
                    }
                }
                out.push('\n');
            }
        }
    }
    out
}

/// Pulls the `#N` pool index back out of a rendered disassembly line so the
/// caller can look up a resolved comment, without having `disasm` carry a
/// parallel structured representation solely for this.
fn pool_index_operand(rendered: &str) -> Option<u16> {
    let hash = rendered.find('#')?;
    let digits: String = rendered[hash + 1..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}
