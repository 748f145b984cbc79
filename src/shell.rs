// SPDX: CC0-1.0

use crate::{
    eval::{Expr, Ident, IdentKey, Idents},
    lex::SubStr,
};
use anyhow::Context;
use core::fmt;
use std::io::{self, stdin, BufRead, Write};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Help,
    Quit,
    SetExpr,
    SetRange,
    PrintTree,
    Plot,
}

impl Command {
    pub const fn exhaustive() -> &'static [Command] {
        &[
            Self::Help,
            Self::Quit,
            Self::SetExpr,
            Self::SetRange,
            Self::Plot,
            Self::PrintTree,
        ]
    }

    pub const fn help(&self) -> &'static str {
        match self {
            Self::Help => "display help for each command",
            Self::Quit => "quit the shell",
            Self::SetExpr => "set function of x to plot",
            Self::SetRange => "set min and max x",
            Self::PrintTree => "print tree parsed from the function (for debugging)",
            Self::Plot => "plot function that has been set",
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::Help => "help",
            Self::Quit => "quit",
            Self::SetExpr => "set",
            Self::SetRange => "range",
            Self::PrintTree => "tree",
            Self::Plot => "plot",
        }
    }
}

impl core::str::FromStr for Command {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        for c in Self::exhaustive() {
            if s == c.name() {
                return Ok(*c);
            }
        }
        Err(())
    }
}

pub fn input<W: Write>(out: W, prompt: impl fmt::Display) -> anyhow::Result<String> {
    fn inner<W: Write>(mut out: W, prompt: impl fmt::Display) -> io::Result<String> {
        write!(out, "{prompt}")?;
        out.flush()?;
        let mut stdin = stdin().lock();
        let mut s = String::new();
        stdin.read_line(&mut s)?;
        Ok(s.trim().to_string())
    }

    let s = inner(out, prompt).context("read from standard input failed")?;
    Ok(s)
}

pub fn input_or_keep<W: Write>(
    mut out: W,
    name: impl fmt::Display,
    dst: &mut String,
) -> anyhow::Result<()> {
    let new = input(&mut out, format_args!("?{name} (is '{dst}') = "))?;
    if !new.is_empty() {
        *dst = new;
    }
    Ok(())
}

pub fn underline<W: Write>(mut out: W, span: &SubStr) -> io::Result<()> {
    let src = span.src();
    let col = src[..span.start()].chars().count();
    let width = span.get().chars().count().max(1);
    writeln!(out, "{src}")?;
    writeln!(out, "{}{}", " ".repeat(col), "^".repeat(width))?;
    Ok(())
}

pub fn dump_tree<W: Write>(mut out: W, expr: &Expr, title: fmt::Arguments) -> io::Result<()> {
    fn inner<W: Write>(out: &mut W, expr: &Expr, depth: usize) -> io::Result<()> {
        writeln!(out, "{}{expr}", "  ".repeat(depth))?;
        for child in expr.children() {
            inner(out, child, depth + 1)?;
        }
        Ok(())
    }

    writeln!(out, "{title}: ")?;
    inner(&mut out, expr, 1)
}

pub fn most_similar<'a>(idents: &'a Idents, name: &str) -> Option<(&'a IdentKey, &'a Ident)> {
    idents
        .iter()
        .map(|(k, v)| {
            (
                strsim::normalized_damerau_levenshtein(
                    &name.to_ascii_lowercase(),
                    &k.get().to_ascii_lowercase(),
                ),
                (k, v),
            )
        })
        .filter(|(sim, _)| *sim > 0.3)
        .reduce(|(acc_sim, acc_kv), (elem_sim, elem_kv)| {
            if elem_sim > acc_sim {
                (elem_sim, elem_kv)
            } else {
                (acc_sim, acc_kv)
            }
        })
        .map(|(_, kv)| kv)
}
