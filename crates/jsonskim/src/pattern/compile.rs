use alloc::{string::String, vec::Vec};

use super::{Match, MatchFlags, Pattern, Selector, Step};
use crate::error::{PatternError, PatternErrorKind};

/// Characters with a meaning of their own outside quotes.
fn is_special(c: char) -> bool {
    matches!(
        c,
        '/' | ',' | '*' | '@' | '(' | ')' | '[' | ']' | '\'' | '\\'
    )
}

fn starts_name(c: char) -> bool {
    c == '\'' || !is_special(c)
}

pub(super) fn compile(source: &str) -> Result<Pattern, PatternError> {
    if source.is_empty() {
        return Ok(Pattern::root());
    }

    let mut parser = Parser {
        source,
        chars: source.chars().collect(),
        pos: 0,
    };
    let mut steps = Vec::new();
    loop {
        steps.push(parser.step()?);
        match parser.peek() {
            None => break,
            Some('/') => parser.pos += 1,
            Some(c) => return Err(parser.misplaced(c)),
        }
    }

    let captures = steps.iter().any(|step| match step {
        Step::Matches(matches) => matches.iter().any(|m| m.flags.capture),
        Step::Recursive { .. } => false,
    });
    if !captures {
        return Err(parser.error_at(0, PatternErrorKind::NoCapture));
    }

    let mut pattern = Pattern::from_steps(source, steps);
    let mut slot = 0;
    for step in &mut pattern.steps {
        if let Step::Matches(matches) = step {
            for m in matches.iter_mut().filter(|m| m.flags.capture) {
                m.slot = Some(slot);
                slot += 1;
            }
        }
    }
    Ok(pattern)
}

struct Parser<'p> {
    source: &'p str,
    chars: Vec<char>,
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_second(&self) -> Option<char> {
        self.chars.get(self.pos + 1).copied()
    }

    fn eat(&mut self, c: char) -> bool {
        let hit = self.peek() == Some(c);
        if hit {
            self.pos += 1;
        }
        hit
    }

    fn at_recursive(&self) -> bool {
        self.peek() == Some('*') && self.peek_second() == Some('*')
    }

    fn error(&self, kind: PatternErrorKind) -> PatternError {
        self.error_at(self.pos, kind)
    }

    fn error_at(&self, offset: usize, kind: PatternErrorKind) -> PatternError {
        PatternError {
            kind,
            offset,
            pattern: self.source.into(),
        }
    }

    /// The error for `c` showing up where an alternative has already ended.
    fn misplaced(&self, c: char) -> PatternError {
        self.error(match c {
            ')' => PatternErrorKind::UnmatchedParen,
            '[' => PatternErrorKind::MisplacedArray,
            '@' => PatternErrorKind::MisplacedProcess,
            '*' => PatternErrorKind::MisplacedWildcard,
            ']' | '\\' => PatternErrorKind::ReservedCharacter(c),
            _ => PatternErrorKind::MisplacedGroup,
        })
    }

    fn step(&mut self) -> Result<Step, PatternError> {
        match self.peek() {
            None | Some('/') => return Err(self.error(PatternErrorKind::EmptyStep)),
            _ if self.at_recursive() => {
                self.pos += 2;
                let process = self.eat('@');
                return match self.peek() {
                    None | Some('/') => Ok(Step::Recursive { process }),
                    Some('*') => Err(self.error(PatternErrorKind::MisplacedWildcard)),
                    Some(_) => Err(self.error(PatternErrorKind::MisplacedRecursive)),
                };
            }
            _ => {}
        }

        let mut matches = Vec::new();
        loop {
            self.alternative(&mut matches)?;
            match self.peek() {
                Some(',') => {
                    self.pos += 1;
                    if matches!(self.peek(), None | Some('/')) {
                        return Err(self.error(PatternErrorKind::EmptyMatch));
                    }
                }
                None | Some('/') => return Ok(Step::Matches(matches)),
                Some(c) => return Err(self.misplaced(c)),
            }
        }
    }

    /// Parses one alternative; a capture group adds one match per item.
    fn alternative(&mut self, matches: &mut Vec<Match>) -> Result<(), PatternError> {
        let selector = match self.peek() {
            Some('(') => return self.group(matches),
            Some(',') => return Err(self.error(PatternErrorKind::EmptyMatch)),
            Some('*') if self.at_recursive() => {
                return Err(self.error(PatternErrorKind::MisplacedRecursive));
            }
            Some('*') => self.wildcard()?,
            Some(c) if starts_name(c) => Selector::Name(self.name()?),
            Some('@') => return Err(self.error(PatternErrorKind::MisplacedProcess)),
            Some(c) => return Err(self.misplaced(c)),
            None => return Err(self.error(PatternErrorKind::EmptyMatch)),
        };

        if self.peek() == Some('(') {
            return Err(self.error(PatternErrorKind::MisplacedGroup));
        }
        let process = self.eat('@');
        if self.peek() == Some('[') {
            return Err(self.error(PatternErrorKind::MisplacedArray));
        }
        matches.push(Match {
            selector,
            flags: MatchFlags {
                process,
                ..MatchFlags::default()
            },
            slot: None,
        });
        Ok(())
    }

    fn group(&mut self, matches: &mut Vec<Match>) -> Result<(), PatternError> {
        let open = self.pos;
        self.pos += 1;

        if self.eat(')') {
            let array = self.brackets()?;
            let process = self.eat('@');
            matches.push(Match {
                selector: Selector::Keys,
                flags: MatchFlags {
                    capture: true,
                    array,
                    keys: true,
                    process,
                },
                slot: None,
            });
            return Ok(());
        }

        let first = matches.len();
        loop {
            let selector = match self.peek() {
                None => return Err(self.error_at(open, PatternErrorKind::UnclosedGroup)),
                Some('(') => return Err(self.error(PatternErrorKind::NestedGroup)),
                Some('/') => return Err(self.error(PatternErrorKind::SlashInGroup)),
                Some(',' | ')') => return Err(self.error(PatternErrorKind::EmptyMatch)),
                Some('*') if self.at_recursive() => {
                    return Err(self.error(PatternErrorKind::MisplacedRecursive));
                }
                Some('*') => self.wildcard()?,
                Some(c) if starts_name(c) => Selector::Name(self.name()?),
                Some(c) => return Err(self.misplaced(c)),
            };
            let array = self.brackets()?;
            let process = self.eat('@');
            matches.push(Match {
                selector,
                flags: MatchFlags {
                    capture: true,
                    array,
                    keys: false,
                    process,
                },
                slot: None,
            });

            match self.peek() {
                Some(',') => self.pos += 1,
                Some(')') => {
                    self.pos += 1;
                    break;
                }
                None => return Err(self.error_at(open, PatternErrorKind::UnclosedGroup)),
                Some('(') => return Err(self.error(PatternErrorKind::NestedGroup)),
                Some('/') => return Err(self.error(PatternErrorKind::SlashInGroup)),
                Some(c) => return Err(self.misplaced(c)),
            }
        }

        // `(a,b)[]@` applies to every item of the group.
        let array = self.brackets()?;
        let process = self.eat('@');
        for m in &mut matches[first..] {
            m.flags.array |= array;
            m.flags.process |= process;
        }
        Ok(())
    }

    fn wildcard(&mut self) -> Result<Selector, PatternError> {
        self.pos += 1;
        match self.peek() {
            Some(c) if starts_name(c) => Err(self.error(PatternErrorKind::MisplacedWildcard)),
            _ => Ok(Selector::Any),
        }
    }

    /// `[]` after a capture.
    fn brackets(&mut self) -> Result<bool, PatternError> {
        if self.peek() != Some('[') {
            return Ok(false);
        }
        if self.peek_second() != Some(']') {
            return Err(self.error(PatternErrorKind::MisplacedArray));
        }
        self.pos += 2;
        Ok(true)
    }

    /// A name made of plain characters and quoted runs, e.g. `a'/'b`.
    fn name(&mut self) -> Result<String, PatternError> {
        let mut name = String::new();
        while let Some(c) = self.peek() {
            if c == '\'' {
                let open = self.pos;
                self.pos += 1;
                loop {
                    match self.peek() {
                        None => {
                            return Err(self.error_at(open, PatternErrorKind::UnterminatedQuote));
                        }
                        Some('\'') if self.peek_second() == Some('\'') => {
                            name.push('\'');
                            self.pos += 2;
                        }
                        Some('\'') => {
                            self.pos += 1;
                            break;
                        }
                        // Document names are unescaped, so `\\` here is one `\`.
                        Some('\\') => {
                            let Some(escaped) = self.peek_second() else {
                                return Err(self.error_at(open, PatternErrorKind::UnterminatedQuote));
                            };
                            name.push(escaped);
                            self.pos += 2;
                        }
                        Some(c) => {
                            name.push(c);
                            self.pos += 1;
                        }
                    }
                }
            } else if is_special(c) {
                break;
            } else {
                name.push(c);
                self.pos += 1;
            }
        }

        if self.peek() == Some('*') {
            return Err(self.error(PatternErrorKind::MisplacedWildcard));
        }
        Ok(name)
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;

    fn names(step: &Step) -> Vec<(Selector, MatchFlags)> {
        match step {
            Step::Matches(matches) => matches
                .iter()
                .map(|m| (m.selector.clone(), m.flags))
                .collect(),
            Step::Recursive { .. } => vec![],
        }
    }

    #[test]
    fn quoted_names() {
        let pattern = compile("'a/b'/('it''s',x'*'y)").unwrap();
        assert_eq!(
            names(&pattern.steps[0]),
            [(Selector::Name("a/b".into()), MatchFlags::default())]
        );
        let captured: Vec<_> = names(&pattern.steps[1])
            .into_iter()
            .map(|(s, _)| s)
            .collect();
        assert_eq!(
            captured,
            [
                Selector::Name("it's".into()),
                Selector::Name("x*y".into())
            ]
        );
    }

    #[test]
    fn backslash_escapes_inside_quotes() {
        let pattern = compile(r"'da\\ta'/('a\'b',x'\\')").unwrap();
        assert_eq!(names(&pattern.steps[0])[0].0, Selector::Name(r"da\ta".into()));
        let captured: Vec<_> = names(&pattern.steps[1])
            .into_iter()
            .map(|(s, _)| s)
            .collect();
        assert_eq!(
            captured,
            [Selector::Name("a'b".into()), Selector::Name(r"x\".into())]
        );
        assert_eq!(
            compile(r"('ab\").unwrap_err().kind,
            PatternErrorKind::UnterminatedQuote
        );
    }

    #[test]
    fn empty_quoted_name() {
        let pattern = compile("('')").unwrap();
        assert_eq!(
            names(&pattern.steps[0])[0].0,
            Selector::Name(String::new())
        );
    }

    #[test]
    fn group_suffix_applies_to_every_item() {
        let pattern = compile("(a,b[])@").unwrap();
        let flags: Vec<_> = names(&pattern.steps[0])
            .into_iter()
            .map(|(_, f)| (f.array, f.process))
            .collect();
        assert_eq!(flags, [(false, true), (true, true)]);
    }

    #[test]
    fn slots_follow_capture_order() {
        let pattern = compile("x,(a)/(b,c)").unwrap();
        let Step::Matches(first) = &pattern.steps[0] else {
            panic!("expected matches");
        };
        let Step::Matches(second) = &pattern.steps[1] else {
            panic!("expected matches");
        };
        assert_eq!(first[0].slot, None);
        assert_eq!(first[1].slot, Some(0));
        assert_eq!(second[0].slot, Some(1));
        assert_eq!(second[1].slot, Some(2));
    }

    #[test]
    fn recursive_step() {
        let pattern = compile("**@/(x)").unwrap();
        assert_eq!(pattern.steps[0], Step::Recursive { process: true });
    }

    #[test]
    fn whitespace_is_part_of_names() {
        let pattern = compile(" a /( b )").unwrap();
        assert_eq!(names(&pattern.steps[0])[0].0, Selector::Name(" a ".into()));
        assert_eq!(names(&pattern.steps[1])[0].0, Selector::Name(" b ".into()));
    }
}
