// Path: crates/cli/src/util.rs
//! Interactive prompt and rendering helpers for the operator commands.

use std::io::Write;

/// Read a string from the command line with a prompt. If a default is
/// provided it is offered and selected on empty input; otherwise the
/// prompt loops until the user types something. `hidden` suppresses echo
/// for password entry.
pub fn read_string(prompt: &str, default: &str, hidden: bool) -> String {
    loop {
        if default.is_empty() {
            eprint!("{prompt} > ");
        } else {
            eprint!("{prompt} [{default}] > ");
        }
        let _ = std::io::stderr().flush();

        let line = if hidden {
            rpassword::read_password().unwrap_or_default()
        } else {
            let mut buffer = String::new();
            let _ = std::io::stdin().read_line(&mut buffer);
            buffer
        };

        let text = line.trim();
        if text.is_empty() {
            if !default.is_empty() {
                return default.to_string();
            }
            continue;
        }
        return text.to_string();
    }
}

/// Read a line that may legitimately be empty (selection loops use the
/// empty line as "done").
pub fn read_line_allow_empty(prompt: &str) -> String {
    eprint!("{prompt} > ");
    let _ = std::io::stderr().flush();
    let mut buffer = String::new();
    let _ = std::io::stdin().read_line(&mut buffer);
    buffer.trim().to_string()
}

/// Retrieve a previously defined password from the operator.
pub fn collect_password() -> String {
    read_string("Password", "", true)
}

/// Ask for a new password twice, looping until both entries match.
pub fn collect_new_password() -> String {
    loop {
        let password = read_string("Set a new password", "", true);
        let check = read_string("Confirm", "", true);
        if password == check {
            return password;
        }
        eprintln!("Password mismatch, please try again");
    }
}

/// Prompt a yes/no question with a default answer.
pub fn ask_yes_no(question: &str, default_yes: bool) -> bool {
    let default = if default_yes { "y" } else { "n" };
    loop {
        match read_string(&format!("{question} y/n"), default, false).as_str() {
            "y" => return true,
            "n" => return false,
            _ => eprintln!("\"y\" or \"n\", please"),
        }
    }
}

/// Prompt the user to toggle selections from a list by number. When
/// `required` is set at least one selection must remain to finish.
pub fn select_from_list(
    options: &[String],
    prompt: &str,
    default_selected: bool,
    required: bool,
) -> Vec<String> {
    let mut selected: Vec<bool> = vec![default_selected; options.len()];

    eprintln!("{prompt}");
    loop {
        for (index, option) in options.iter().enumerate() {
            let mark = if selected.get(index).copied().unwrap_or(false) {
                "*"
            } else {
                " "
            };
            eprintln!("{index}. [{mark}]\t{option}");
        }
        let choice = read_string("Choose number to toggle", "done", false);
        if choice == "done" {
            let chosen: Vec<String> = options
                .iter()
                .zip(&selected)
                .filter(|(_, on)| **on)
                .map(|(option, _)| option.clone())
                .collect();
            if !chosen.is_empty() || !required {
                return chosen;
            }
            eprintln!("Please select a minimum of one");
            continue;
        }
        if let Ok(index) = choice.parse::<usize>() {
            if let Some(flag) = selected.get_mut(index) {
                *flag = !*flag;
            }
        }
    }
}

/// Split a whitespace-separated argument string, respecting double-quoted
/// segments. `a "b c" d` yields three arguments.
pub fn split_arguments(input: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut pending = false;

    for c in input.chars() {
        match c {
            '"' => {
                quoted = !quoted;
                pending = true;
            }
            c if c.is_whitespace() && !quoted => {
                if pending {
                    args.push(std::mem::take(&mut current));
                    pending = false;
                }
            }
            c => {
                current.push(c);
                pending = true;
            }
        }
    }
    if pending {
        args.push(current);
    }
    args
}

/// Printable representation of a name with arguments, redacting the
/// arguments when they are private-fact digests.
pub fn string_with_args(item: &str, args: &[String], private: bool) -> String {
    if args.is_empty() {
        return item.to_string();
    }
    let rendered: Vec<String> = args
        .iter()
        .map(|arg| {
            if private {
                "REDACTED".to_string()
            } else {
                format!("\"{arg}\"")
            }
        })
        .collect();
    format!("{item}({})", rendered.join(", "))
}

/// Printable strings for every entry of a task or fact selection map.
pub fn map_strings(
    map: &std::collections::BTreeMap<String, Vec<String>>,
    private: impl Fn(&str) -> bool,
) -> Vec<String> {
    map.iter()
        .map(|(name, args)| string_with_args(name, args, private(name)))
        .collect()
}

/// Render a plain-text table with padded columns.
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) {
    let columns = headers.len();
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (index, cell) in row.iter().enumerate().take(columns) {
            if let Some(width) = widths.get_mut(index) {
                *width = (*width).max(cell.len());
            }
        }
    }

    let line = |cells: Vec<String>| {
        let mut out = String::new();
        for (index, cell) in cells.iter().enumerate().take(columns) {
            let width = widths.get(index).copied().unwrap_or(0);
            out.push_str(&format!("{cell:<width$}  "));
        }
        println!("{}", out.trim_end());
    };

    line(headers.iter().map(|h| h.to_string()).collect());
    line(widths.iter().map(|w| "-".repeat(*w)).collect());
    for row in rows {
        line(row.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_plain_arguments() {
        assert_eq!(
            split_arguments("get-file /etc/passwd /etc/shadow"),
            vec!["get-file", "/etc/passwd", "/etc/shadow"]
        );
    }

    #[test]
    fn split_respects_quotes() {
        assert_eq!(
            split_arguments(r#"task "a b" c"#),
            vec!["task", "a b", "c"]
        );
        assert_eq!(split_arguments(r#"task """#), vec!["task", ""]);
    }

    #[test]
    fn split_empty_input() {
        assert!(split_arguments("").is_empty());
        assert!(split_arguments("   ").is_empty());
    }

    #[test]
    fn string_with_args_rendering() {
        assert_eq!(string_with_args("osquery-collect", &[], false), "osquery-collect");
        assert_eq!(
            string_with_args("get-file", &["/etc/passwd".to_string()], false),
            "get-file(\"/etc/passwd\")"
        );
        assert_eq!(
            string_with_args("user-exists", &["deadbeef".to_string()], true),
            "user-exists(REDACTED)"
        );
    }
}
