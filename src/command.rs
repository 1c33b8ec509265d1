use anyhow::{bail, Context};
use megascan_view::{FragmentId, PageLimit, Status, Verdict};

/// Команда интерактивного режима ревью.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Перейти на страницу (зажимается в допустимый диапазон)
    GoTo(i64),
    First,
    Last,
    SkipLeft,
    SkipRight,
    Reload,
    SetStatus(Status),
    SetLimit(PageLimit),
    Mark(Verdict, FragmentId),
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  g N            go to page N          <  >   skip 10 pages back/forward
  first | last   first/last page       r      reload current page
  s new|closed   switch status         l N    page size (10|20|50|100)
  v CODE ID      verdict by code (0=info 1=close 2=verify)
  i ID | c ID | ok ID                  info / close / verify
  ? | :q";

pub fn parse_command(s: &str) -> anyhow::Result<Command> {
    let parts: Vec<&str> = s.split_whitespace().collect();
    let Some((&head, args)) = parts.split_first() else {
        bail!("empty command");
    };

    let cmd = match (head, args) {
        ("g" | "goto", [n]) => Command::GoTo(n.parse().with_context(|| format!("bad page: {n}"))?),
        ("first" | "<<", []) => Command::First,
        ("last" | ">>", []) => Command::Last,
        ("<", []) => Command::SkipLeft,
        (">", []) => Command::SkipRight,
        ("r" | "reload", []) => Command::Reload,
        ("s" | "status", [st]) => Command::SetStatus(st.parse()?),
        ("l" | "limit", [n]) => Command::SetLimit(n.parse()?),
        ("v" | "verdict", [code, id]) => Command::Mark(code.parse()?, parse_id(id)),
        ("i" | "info", [id]) => Command::Mark(Verdict::Info, parse_id(id)),
        ("c" | "close", [id]) => Command::Mark(Verdict::Close, parse_id(id)),
        ("ok" | "verify", [id]) => Command::Mark(Verdict::Verify, parse_id(id)),
        ("?" | "h" | "help", []) => Command::Help,
        (":q" | ":quit" | "q", []) => Command::Quit,
        _ => bail!("unknown command: {s:?} (try ?)"),
    };
    Ok(cmd)
}

fn parse_id(s: &str) -> FragmentId {
    match s.parse() {
        Ok(id) => id,
        Err(never) => match never {},
    }
}
