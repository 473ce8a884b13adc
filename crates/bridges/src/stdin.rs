//! Line pumps feeding [`controller::Controller::attach_input`].
//!
//! Reading stdin blocks with no way to interrupt it, so the pump thread is
//! detached. It ends on EOF or once the receiving side is dropped.

use std::{
    io::{self, BufRead},
    thread,
};

use anyhow::Context;
use crossbeam_channel::Receiver;

pub fn spawn_stdin_reader() -> anyhow::Result<Receiver<String>> {
    spawn_line_reader("stdin", io::BufReader::new(io::stdin()))
}

pub fn spawn_line_reader<R>(name: &str, reader: R) -> anyhow::Result<Receiver<String>>
where
    R: BufRead + Send + 'static,
{
    let (tx, rx) = crossbeam_channel::unbounded();
    let source = name.to_string();
    thread::Builder::new()
        .name(format!("{name}-pump"))
        .spawn(move || {
            for line in reader.lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(err) => {
                        tracing::warn!(source, error = %err, "input read failed");
                        break;
                    }
                };
                if tx.send(line).is_err() {
                    break;
                }
            }
            tracing::debug!(source, "input closed");
        })
        .with_context(|| format!("failed to spawn {name} reader"))?;
    Ok(rx)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Cursor;

    #[test]
    fn forwards_lines_until_eof() {
        let input = Cursor::new("#clock.toggle\n\nmenu-open-1\n");
        let rx = spawn_line_reader("test", input).expect("reader");
        let lines: Vec<String> = rx.iter().collect();
        assert_eq!(lines, vec!["#clock.toggle", "", "menu-open-1"]);
    }
}
