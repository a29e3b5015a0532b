//! XML declaration version shim
//!
//! Jenkins serves job configs declared as XML 1.1 while its own templates and
//! most parsers expect 1.0. Documents are normalized to 1.0 before decoding
//! and restored to 1.1 after encoding.

/// Version Jenkins declares on stored job configs
pub const JENKINS_XML_VERSION: &str = "1.1";

/// Version documents are normalized to while they are worked on
pub const WORKING_XML_VERSION: &str = "1.0";

/// Rewrites the `version` of the XML declaration on the first line from
/// `from` to `to`. Everything else, including the rest of the first line,
/// is left untouched.
///
/// A first line that does not declare version `from` is returned as is.
/// Older Jenkins releases already emit 1.0 documents, so a missing 1.1
/// token is not treated as an error.
pub fn rewrite_declared_version(xml: &str, from: &str, to: &str) -> String {
    let line_end = xml.find('\n').unwrap_or(xml.len());
    let (first_line, rest) = xml.split_at(line_end);

    match version_value_range(first_line) {
        Some((start, end)) if &first_line[start..end] == from => {
            tracing::trace!(from, to, "Rewriting declared XML version");
            let mut output = String::with_capacity(xml.len() + to.len());
            output.push_str(&first_line[..start]);
            output.push_str(to);
            output.push_str(&first_line[end..]);
            output.push_str(rest);
            output
        }
        _ => {
            tracing::debug!(from, to, "XML declaration does not declare the expected version");
            xml.to_string()
        }
    }
}

/// Byte range of the quoted `version` value inside the `<?xml ... ?>`
/// declaration of `line`.
fn version_value_range(line: &str) -> Option<(usize, usize)> {
    let decl_start = line.find("<?xml")?;
    let decl_end = decl_start + line[decl_start..].find("?>")?;
    let decl = &line[decl_start..decl_end];

    let key = decl.find("version")?;
    let after_key = &decl[key + "version".len()..];
    let eq = after_key.find('=')?;
    if !after_key[..eq].trim().is_empty() {
        return None;
    }

    let after_eq = &after_key[eq + 1..];
    let value_offset = after_eq.len() - after_eq.trim_start().len();
    let quote = after_eq[value_offset..].chars().next()?;
    if quote != '\'' && quote != '"' {
        return None;
    }

    let value_start = value_offset + 1;
    let value_len = after_eq[value_start..].find(quote)?;

    let base = decl_start + key + "version".len() + eq + 1;
    Some((base + value_start, base + value_start + value_len))
}
