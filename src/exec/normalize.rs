// ABOUTME: Post-processing of captured command output.
// ABOUTME: Trims the trailing newline and optionally splits output into one item per line.

/// How captured stdout is post-processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Collapse whitespace for short `ls` listings, raw otherwise.
    #[default]
    Auto,
    /// Only the trailing newline is removed.
    Raw,
    /// Every run of whitespace becomes a single newline.
    Lines,
}

/// Apply `mode` to the stdout captured for `command`.
pub fn normalize_output(command: &str, stdout: &str, mode: OutputMode) -> String {
    let trimmed = stdout
        .strip_suffix("\r\n")
        .or_else(|| stdout.strip_suffix('\n'))
        .unwrap_or(stdout);

    let collapse = match mode {
        OutputMode::Raw => false,
        OutputMode::Lines => true,
        OutputMode::Auto => is_short_listing(command),
    };

    if collapse {
        trimmed.split_whitespace().collect::<Vec<_>>().join("\n")
    } else {
        trimmed.to_string()
    }
}

/// True when `command` runs `ls` and no invocation asks for the long format.
///
/// Column-aligned short listings are the only output worth splitting; a long
/// listing already has one entry per line and its columns must survive.
pub fn is_short_listing(command: &str) -> bool {
    let mut listings = 0;

    for segment in command.split(['\n', ';', '|', '&', '(', ')']) {
        let mut words = segment.split_whitespace();
        if !words.any(is_ls) {
            continue;
        }
        if words.any(is_long_flag) {
            return false;
        }
        listings += 1;
    }

    listings > 0
}

fn is_ls(word: &str) -> bool {
    word == "ls" || word.ends_with("/ls")
}

fn is_long_flag(word: &str) -> bool {
    match word.strip_prefix("--") {
        Some(long) => long == "format=long" || long == "format=verbose",
        None => word.starts_with('-') && word.contains('l'),
    }
}
