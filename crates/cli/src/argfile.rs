//! `@file` argument expansion.
//!
//! An argument `@path` is replaced by the lines of `path`, one argument per
//! non-empty line. Expanded lines may themselves reference further files.

use anyhow::{bail, Context, Result};
use std::path::Path;

/// Nesting limit for argument files referencing other argument files.
const MAX_DEPTH: usize = 16;

/// Expand every `@path` argument. The first argument (program name) is kept as is.
pub fn expand_args<I>(args: I) -> Result<Vec<String>>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let mut expanded: Vec<String> = args.next().into_iter().collect();
    for arg in args {
        expand_one(arg, 0, &mut expanded)?;
    }
    Ok(expanded)
}

fn expand_one(arg: String, depth: usize, out: &mut Vec<String>) -> Result<()> {
    let Some(path) = arg.strip_prefix('@') else {
        out.push(arg);
        return Ok(());
    };
    if depth >= MAX_DEPTH {
        bail!("argument files nested deeper than {} levels at @{}", MAX_DEPTH, path);
    }

    for line in read_lines(Path::new(path))? {
        expand_one(line, depth + 1, out)?;
    }
    Ok(())
}

fn read_lines(path: &Path) -> Result<Vec<String>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read argument file {:?}", path))?;
    Ok(contents
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}
