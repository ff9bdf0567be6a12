use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, Write},
    path::Path,
};

use log::{info, trace};

use super::{
    error::FdResult,
    frame::Frame,
    resolve::{Outcome, Resolver},
    tools::Toolchain,
};

/// Line counts of a finished conversion
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Summary {
    pub lines: usize,
    pub passthrough: usize,
    pub resolved: usize,
    pub failed: usize,
}

impl Summary {
    fn record(&mut self, outcome: &Outcome) {
        self.lines += 1;
        match outcome {
            Outcome::Passthrough => self.passthrough += 1,
            Outcome::Resolved(_) => self.resolved += 1,
            Outcome::Failed(_) => self.failed += 1,
        }
    }
}

/// Resolve a single line, the terminator already stripped
pub fn convert_line<T: Toolchain>(line: &str, resolver: &mut Resolver<T>) -> Outcome {
    let frame = Frame::parse(line);
    trace!("{:?}", frame);
    resolver.resolve(&frame)
}

/// Write exactly one line to `output` for every line of `input`, in order.
/// Invalid UTF-8 is replaced rather than rejected.
pub fn convert<R, W, T>(mut input: R, mut output: W, resolver: &mut Resolver<T>) -> FdResult<Summary>
where
    R: BufRead,
    W: Write,
    T: Toolchain,
{
    let mut summary = Summary::default();
    let mut buffer = Vec::new();
    loop {
        buffer.clear();
        if input.read_until(b'\n', &mut buffer)? == 0 {
            break;
        }
        let text = String::from_utf8_lossy(&buffer);
        let line = strip_terminator(&text);

        let outcome = convert_line(line, resolver);
        writeln!(output, "{}", outcome.render(line))?;
        summary.record(&outcome);
    }
    output.flush()?;
    Ok(summary)
}

/// Drop one `\n` or `\r\n`, leaving any other trailing `\r` in place
fn strip_terminator(text: &str) -> &str {
    match text.strip_suffix('\n') {
        Some(line) => line.strip_suffix('\r').unwrap_or(line),
        None => text,
    }
}

/// Convert `input` into `output`, truncating `output` if it exists
pub fn convert_file<T: Toolchain>(
    input: &Path,
    output: &Path,
    resolver: &mut Resolver<T>,
) -> FdResult<Summary> {
    let reader = BufReader::new(File::open(input)?);
    let writer = BufWriter::new(File::create(output)?);
    info!("converting {} into {}", input.display(), output.display());

    let summary = convert(reader, writer, resolver)?;
    info!(
        "{} lines: {} resolved, {} failed, {} passed through",
        summary.lines, summary.resolved, summary.failed, summary.passthrough
    );
    Ok(summary)
}

#[cfg(test)]
mod test {
    use tempfile::TempDir;

    use super::{convert, Summary};
    use crate::core::{resolve::Resolver, tools::mock::MockToolchain};

    fn run(input: &str, tools: MockToolchain) -> (String, Summary, Resolver<MockToolchain>) {
        let mut resolver = Resolver::new(tools);
        let mut out = Vec::new();
        let summary = convert(input.as_bytes(), &mut out, &mut resolver).unwrap();
        (String::from_utf8(out).unwrap(), summary, resolver)
    }

    #[test]
    fn passthrough_round_trip() {
        let input = "==== backtrace ====\n>>TIME:3\n>>SIZE:24\n\n<<\n";
        let (out, summary, resolver) = run(input, MockToolchain::default());
        assert_eq!(input, out);
        assert_eq!(5, summary.passthrough);
        assert!(resolver.tools().list_calls.is_empty());
        assert!(resolver.tools().resolve_calls.is_empty());
    }

    #[test]
    fn terminators_are_normalized() {
        let (out, summary, _) = run("first\r\nsecond", MockToolchain::default());
        assert_eq!("first\nsecond\n", out);
        assert_eq!(2, summary.lines);
    }

    #[test]
    fn one_line_out_per_line_in() {
        let dir = TempDir::new().unwrap();
        let app = dir.path().join("myapp");
        std::fs::write(&app, b"").unwrap();
        let tools = MockToolchain::default()
            .with_symbols(&app, "4008e0 T do_work\n400800 T main\n")
            .with_line(&app, 0x4008fa, "src/work.c:42")
            .with_line(&app, 0x400830, "src/main.c:7");

        let a = app.display();
        let input = format!(
            ">>ADDR:\n{a}(do_work+0x1a)[0x4008fa]\n{a}(main+0x30)[0x400830]\n{a}(nope+0x1)[0x1]\n<<\n"
        );
        let (out, summary, resolver) = run(&input, tools);

        assert_eq!(
            format!(
                ">>ADDR:\nsrc/work.c:42\nsrc/main.c:7\n!! Function not found: {a}\n<<\n"
            ),
            out
        );
        assert_eq!(
            Summary {
                lines: 5,
                passthrough: 2,
                resolved: 2,
                failed: 1
            },
            summary
        );
        assert_eq!(1, resolver.tools().list_calls.len());
    }

    #[test]
    fn only_one_terminator_is_stripped() {
        let (out, _, _) = run("abc\r\r\nplain\r\n", MockToolchain::default());
        assert_eq!("abc\r\nplain\n", out);
    }

    #[test]
    fn listing_without_text_symbols_stays_on_one_line() {
        let dir = TempDir::new().unwrap();
        let app = dir.path().join("myapp");
        std::fs::write(&app, b"").unwrap();
        let tools = MockToolchain::default().with_symbols(
            &app,
            "0000000000601040 B counter\n0000000000601048 D table\n",
        );

        let input = format!("{}(do_work+0x1a)[0x4008fa]\n", app.display());
        let (out, summary, _) = run(&input, tools);

        assert_eq!(
            "!! 0000000000601040 B counter; 0000000000601048 D table\n",
            out
        );
        assert_eq!(input.lines().count(), out.lines().count());
        assert_eq!(1, summary.failed);
    }

    #[test]
    fn missing_tools_are_reported_per_line() {
        let dir = TempDir::new().unwrap();
        let app = dir.path().join("myapp");
        std::fs::write(&app, b"").unwrap();

        let a = app.display();
        let input = format!("{a}(do_work+0x1a)[0x4008fa]\n{a}(main+0x4)[0x400804]\n");
        let (out, _, resolver) = run(&input, MockToolchain::default().without_tools());

        assert_eq!(
            "!! Unable to run nm: No such file or directory\n".repeat(2),
            out
        );
        assert_eq!(1, resolver.tools().list_calls.len());
        assert!(resolver.tools().resolve_calls.is_empty());
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let mut resolver = Resolver::new(MockToolchain::default());
        let mut out = Vec::new();
        convert(&b"ok\n\xff\xfe\n"[..], &mut out, &mut resolver).unwrap();
        assert_eq!("ok\n\u{fffd}\u{fffd}\n", String::from_utf8(out).unwrap());
    }
}
