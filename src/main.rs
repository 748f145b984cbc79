// SPDX: CC0-1.0

use anyhow::Context;
use chrono::{DateTime, Local};
use function_plotter::{
    eval::{self, EvalErrTyp},
    parse::ParseErrTyp,
    shell::{self, Command},
    stdlib,
    validate::ValidateErrTyp,
    PlotErr, SampleSet,
};
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};
#[cfg(not(debug_assertions))]
use std::process::Stdio;
use std::{
    env,
    fs::OpenOptions,
    io::{stdout, BufWriter, Write},
    process::{self, Child, ExitCode},
    sync::Arc,
};

const OUTPUT_RES: [u32; 2] = [1920, 1080];

const LOG_ENV: &str = "FUNCTION_PLOTTER_LOG";
const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Warn;

fn output_filename(now: DateTime<Local>, ext: &str) -> String {
    format!(
        "{}_output-{}.{}",
        env!("CARGO_PKG_NAME"),
        now.format("%Y-%m-%d_%H-%M-%S"),
        ext
    )
}

fn main() -> ExitCode {
    match try_main() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("unexpected error: {err}");
            let chain = err.chain();
            if chain.len() > 1 {
                eprintln!();
                eprintln!("context:");
                for it in chain.skip(1) {
                    eprintln!("  {it}");
                }
            }
            ExitCode::FAILURE
        }
    }
}

fn init_logging() -> anyhow::Result<()> {
    let requested = env::var(LOG_ENV).ok();
    let parsed = requested.as_deref().map(str::parse::<LevelFilter>);
    let level = match &parsed {
        Some(Ok(level)) => *level,
        _ => DEFAULT_LOG_LEVEL,
    };

    TermLogger::init(
        level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )
    .context("failed to install logger")?;

    if let (Some(Err(_)), Some(requested)) = (&parsed, &requested) {
        log::warn!(
            "ignoring {LOG_ENV}={requested:?}, expected one of off, error, warn, info, debug, trace"
        );
    }
    Ok(())
}

#[derive(Debug)]
struct State {
    expr: String,
    min_x: String,
    max_x: String,
    gnuplot: Option<Child>,
}

fn try_main() -> anyhow::Result<()> {
    init_logging()?;

    let mut state = State {
        expr: String::from("5*x^3 + 2*x"),
        min_x: String::from("-10"),
        max_x: String::from("10"),
        gnuplot: None,
    };

    let mut stdout = BufWriter::new(stdout());
    loop {
        writeln!(
            stdout,
            "f(x) = {} for x in [{}, {}]",
            state.expr, state.min_x, state.max_x
        )?;

        let mut try_cmd = shell::input(&mut stdout, "> ")?;
        try_cmd.make_ascii_lowercase();
        writeln!(stdout)?;

        if let Ok(cmd) = try_cmd.parse::<Command>() {
            match cmd {
                Command::Help => {
                    for c in Command::exhaustive() {
                        writeln!(stdout, "{name}: {help}", name = c.name(), help = c.help())?;
                    }
                }

                Command::Quit => break,

                Command::SetExpr => set_expr(&mut stdout, &mut state)?,

                Command::SetRange => {
                    writeln!(stdout, "note: leave blank to skip")?;
                    shell::input_or_keep(&mut stdout, "min x", &mut state.min_x)?;
                    shell::input_or_keep(&mut stdout, "max x", &mut state.max_x)?;
                }

                Command::Plot => plot_expr(&mut stdout, &mut state)?,

                Command::PrintTree => {
                    match eval::parse_src(&Arc::new(state.expr.clone())) {
                        Ok(expr) => shell::dump_tree(&mut stdout, &expr, format_args!("tree"))?,
                        Err(err) => report(&mut stdout, &PlotErr::Eval(err))?,
                    }
                }
            }
        } else {
            writeln!(stdout, r#"Unknown command, try "help" for help"#)?;
        }

        writeln!(stdout)?;
    }
    stdout.flush()?;
    Ok(())
}

fn set_expr<W: Write>(mut out: W, state: &mut State) -> anyhow::Result<()> {
    let input = shell::input(&mut out, "f(x) = ")?;
    if input.is_empty() {
        return Ok(());
    }
    state.expr = input;

    // report syntax and name errors right away, bounds are checked on plot
    if let Err(err) = eval::compile(&Arc::new(state.expr.clone())) {
        report(&mut out, &PlotErr::Eval(err))?;
    }
    Ok(())
}

fn report<W: Write>(mut out: W, err: &PlotErr) -> anyhow::Result<()> {
    writeln!(out)?;
    let loc = err.loc();
    if !loc.src().is_empty() {
        shell::underline(&mut out, loc)?;
    }
    match err {
        PlotErr::Validate(_) => writeln!(out, "error: {err}")?,
        // already reads "error evaluating function: ..."
        PlotErr::Eval(_) => writeln!(out, "{err}")?,
    }

    match err {
        PlotErr::Validate(err) => match &err.typ {
            ValidateErrTyp::InvalidCharacters => writeln!(
                out,
                "note: available tokens are numbers, letters, whitespace, and symbols +-*/^()"
            )?,
            ValidateErrTyp::NonNumericBound(_, None) => {
                writeln!(out, "note: bounds must be finite")?
            }
            ValidateErrTyp::EmptyExpression
            | ValidateErrTyp::MissingBound(_)
            | ValidateErrTyp::NonNumericBound(_, Some(_))
            | ValidateErrTyp::InvalidRange => {}
        },

        PlotErr::Eval(err) => match &err.typ {
            EvalErrTyp::Syntax(ParseErrTyp::ParseNum(_)) => {
                writeln!(out, "note: parsing as floating point number")?
            }
            EvalErrTyp::Syntax(_) => {}

            EvalErrTyp::AmbiguousNumeralVariable { .. } => writeln!(
                out,
                "note: implicit multiplication is not supported, so for example '5x' would be '5*x'",
            )?,

            EvalErrTyp::UnboundIdentifier { name } => {
                let idents = stdlib::standard_idents();
                if let Some((key, ident)) = shell::most_similar(&idents, name.get()) {
                    writeln!(out, "note: {} '{key}' has a similar name", ident.kind())?;
                } else {
                    writeln!(out, "note: the only variable is 'x'")?;
                }
            }

            EvalErrTyp::NotCallable { .. } => {
                writeln!(out, "note: use '*' to multiply, as in 'x*(x + 1)'")?
            }

            EvalErrTyp::NotAValue { name } => {
                writeln!(out, "note: write '{name}(x)' to apply it to x")?
            }
        },
    }
    Ok(())
}

fn plot_expr<W: Write>(mut out: W, state: &mut State) -> anyhow::Result<()> {
    let samples = match function_plotter::plot(&state.expr, &state.min_x, &state.max_x) {
        Ok(samples) => samples,
        Err(err) => return report(&mut out, &err),
    };

    let non_finite = samples.y.iter().filter(|y| !y.is_finite()).count();
    write!(out, "evaluation ok: {} samples", samples.len())?;
    if non_finite > 0 {
        write!(out, " ({non_finite} undefined)")?;
    }
    writeln!(out)?;
    if let Some(range) = samples.finite_y_range() {
        writeln!(out, "y ranges over [{}, {}]", range.start, range.end)?;
    }

    if let Some(mut old_child) = state.gnuplot.take() {
        old_child
            .kill()
            .context("failed to kill previous gnuplot child")?;
    }
    let child = spawn_gnuplot(&state.expr, &samples)?;
    state.gnuplot = Some(child);
    Ok(())
}

fn spawn_gnuplot(expr: &str, samples: &SampleSet) -> anyhow::Result<Child> {
    let now = Local::now();
    let data_path = output_filename(now, "data");
    let gnuplot_path = output_filename(now, "gnuplot");
    let svg_path = output_filename(now, "svg");

    let mut data = BufWriter::new(
        OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&data_path)
            .context("failed to open output data file")?,
    );
    for p in samples.points() {
        // gnuplot breaks the line at NaN
        let y = if p.y.is_finite() { p.y } else { f64::NAN };
        writeln!(data, "{} {y}", p.x).context("failed to write to output data file")?;
    }
    data.flush()?;
    data.get_mut().sync_data()?;
    drop(data);

    let mut gnuplot = BufWriter::new(
        OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&gnuplot_path)
            .context("failed to open output gnuplot file")?,
    );

    writeln!(gnuplot, "reset")?;
    writeln!(gnuplot, "set term push")?;
    let [width, height] = OUTPUT_RES;
    writeln!(gnuplot, "set terminal svg size {width},{height} enhanced")?;
    writeln!(gnuplot, "set output '{svg_path}'")?;

    if let (Some(first), Some(last)) = (samples.x.first(), samples.x.last()) {
        writeln!(gnuplot, "set xrange[{first}:{last}]")?;
    }
    // (y range determined by data)

    writeln!(gnuplot, r#"set title "Function Plot""#)?;
    writeln!(gnuplot, r#"set xlabel "x""#)?;
    writeln!(gnuplot, r#"set ylabel "y""#)?;
    writeln!(gnuplot, "set grid")?;
    writeln!(gnuplot, "set tics out nomirror")?;
    writeln!(gnuplot, "set key out vertical top right")?;

    writeln!(gnuplot, r#"plot '{data_path}' using 1:2 \"#)?;
    writeln!(gnuplot, r#"  with lines lc '#27422e'\"#)?;
    writeln!(gnuplot, r#"  title "{}" noenhanced"#, expr.replace('"', ""))?;

    writeln!(gnuplot, "set term pop")?;
    writeln!(gnuplot, "replot")?;

    gnuplot.flush()?;
    gnuplot.get_mut().sync_data()?;
    drop(gnuplot);

    let mut cmd = process::Command::new("gnuplot");
    cmd.arg("--persist").arg(&gnuplot_path);
    #[cfg(not(debug_assertions))]
    {
        cmd.stdout(Stdio::null())
            .stderr(Stdio::null())
            .stdin(Stdio::null());
    }
    let child = cmd
        .spawn()
        .context("failed to spawn gnuplot (is it installed and in ${PATH}?)")?;
    log::info!("wrote {data_path} and {gnuplot_path}, spawned gnuplot");
    Ok(child)
}
