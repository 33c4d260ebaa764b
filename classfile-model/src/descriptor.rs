//! Field and method descriptor grammar.
//!
//! Descriptors are plain strings in the constant pool; parsing them is not
//! part of constant-pool or attribute validation, but `jclassdump` wants a
//! readable rendering, so the grammar lives here alongside the other value
//! containers.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid descriptor: {0}")]
pub struct InvalidDescriptor(pub String);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    Byte,
    Char,
    Double,
    Float,
    Int,
    Long,
    Short,
    Boolean,
    Object(String),
    Array(Box<FieldType>),
}

impl FieldType {
    fn parse(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Option<FieldType> {
        Some(match chars.next()? {
            'B' => FieldType::Byte,
            'C' => FieldType::Char,
            'D' => FieldType::Double,
            'F' => FieldType::Float,
            'I' => FieldType::Int,
            'J' => FieldType::Long,
            'S' => FieldType::Short,
            'Z' => FieldType::Boolean,
            'L' => {
                let mut name = String::new();
                loop {
                    match chars.next()? {
                        ';' => break,
                        c => name.push(c),
                    }
                }
                FieldType::Object(name)
            }
            '[' => FieldType::Array(Box::new(FieldType::parse(chars)?)),
            _ => return None,
        })
    }
}

/// A fully parsed `(param, param, ...)return` method descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    pub parameters: Vec<FieldType>,
    pub return_type: Option<FieldType>,
}

pub fn parse_field_descriptor(descriptor: &str) -> Result<FieldType, InvalidDescriptor> {
    let mut chars = descriptor.chars().peekable();
    let parsed = FieldType::parse(&mut chars).ok_or_else(|| InvalidDescriptor(descriptor.into()))?;
    if chars.next().is_some() {
        return Err(InvalidDescriptor(descriptor.into()));
    }
    Ok(parsed)
}

pub fn parse_method_descriptor(descriptor: &str) -> Result<MethodDescriptor, InvalidDescriptor> {
    let bad = || InvalidDescriptor(descriptor.into());
    let rest = descriptor.strip_prefix('(').ok_or_else(bad)?;
    let (params_str, return_str) = rest.split_once(')').ok_or_else(bad)?;

    let mut chars = params_str.chars().peekable();
    let mut parameters = Vec::new();
    while chars.peek().is_some() {
        parameters.push(FieldType::parse(&mut chars).ok_or_else(bad)?);
    }

    let return_type = if return_str == "V" {
        None
    } else {
        Some(parse_field_descriptor(return_str)?)
    };

    Ok(MethodDescriptor {
        parameters,
        return_type,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_primitive_field_descriptor() {
        assert_eq!(parse_field_descriptor("I").unwrap(), FieldType::Int);
    }

    #[test]
    fn parses_array_of_object_field_descriptor() {
        assert_eq!(
            parse_field_descriptor("[Ljava/lang/String;").unwrap(),
            FieldType::Array(Box::new(FieldType::Object("java/lang/String".into())))
        );
    }

    #[test]
    fn parses_method_descriptor_with_void_return() {
        let desc = parse_method_descriptor("(ILjava/lang/String;[B)V").unwrap();
        assert_eq!(
            desc.parameters,
            vec![
                FieldType::Int,
                FieldType::Object("java/lang/String".into()),
                FieldType::Array(Box::new(FieldType::Byte)),
            ]
        );
        assert_eq!(desc.return_type, None);
    }

    #[test]
    fn rejects_malformed_descriptor() {
        assert!(parse_field_descriptor("Q").is_err());
        assert!(parse_method_descriptor("(I").is_err());
    }
}
