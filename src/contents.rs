//! Index file content synthesis and comparison

use crate::module::Module;
use crate::options::Options;

/// Line terminator of generated index files.
pub const EOL: &str = "\r\n";

/// Replace `{key}` placeholders in a single pass.
///
/// Braces that do not open a known placeholder are copied through, so a
/// template like `export { {moduleList} };` keeps its outer braces. Values are
/// never re-scanned.
pub fn render_template(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        let placeholder = after.find('}').and_then(|close| {
            let key = &after[..close];
            vars.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, value)| (*value, close))
        });

        match placeholder {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Render the index file for an ordered module list.
///
/// `seed` is prepended verbatim. With no modules, only the seed is returned.
pub fn synthesize(modules: &[Module], options: &Options, seed: Option<&str>) -> String {
    let mut content = seed.unwrap_or_default().to_string();

    for module in modules {
        let template = if module.has_recursion {
            &options.recursion_template
        } else {
            &options.module_template
        };
        push_line(
            &mut content,
            render_template(template, &[("name", &module.name), ("path", &module.path)]),
        );
    }

    let nested: Vec<&str> = modules
        .iter()
        .filter(|m| m.has_recursion)
        .map(|m| m.name.as_str())
        .collect();
    if !nested.is_empty() {
        let list = nested.join(", ");
        push_line(
            &mut content,
            render_template(&options.recursion_template_export, &[("moduleList", &list)]),
        );
    }

    content
}

fn push_line(content: &mut String, line: String) {
    // An empty template disables its line entirely
    if line.is_empty() {
        return;
    }
    content.push_str(&line);
    content.push_str(EOL);
}

/// Lines that take part in comparison: trimmed, without blanks and `//` comments.
fn significant_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with("//"))
}

/// Check whether two index texts differ only in comments and whitespace.
pub fn equivalent(a: &str, b: &str) -> bool {
    significant_lines(a).eq(significant_lines(b))
}
