use nom::{anychar, is_space, IResult};
use num_traits::One;
use std::fmt::Debug;
use std::hash::Hash;
use std::str::{from_utf8, FromStr};

use crate::pcfg::{Grammar, Rule, Symbol};

/// Reads a grammar in the textual notation
///
/// ```text
/// initial: [S]
/// S  → [Nt NP, Nt VP] # 0.5    % ordinary rule
/// NP → [T NP]                  % terminal marker rule, weight defaults to 1
/// ```
///
/// Split symbols have no textual form; binarised grammars travel through the
/// `storage` module instead.
impl<N, T, W> FromStr for Grammar<N, T, W>
where
    N: FromStr + Clone + Eq + Hash + Ord,
    N::Err: Debug,
    T: FromStr + Clone + Eq + Hash + Ord,
    T::Err: Debug,
    W: FromStr + Clone + Ord + One,
    W::Err: Debug,
{
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut initial = None;
        let mut rules = Vec::new();

        for line in s.lines().map(str::trim) {
            if line.is_empty() || line.starts_with('%') {
                continue;
            }
            if line.starts_with("initial:") {
                match parse_initial(line.as_bytes()) {
                    IResult::Done(_, symbol) => initial = Some(symbol),
                    _ => {
                        return Err(format!(
                            "Malformed declaration of the initial symbol: \'{}\'",
                            line
                        ))
                    }
                }
            } else {
                rules.push(line.parse()?);
            }
        }

        match initial {
            Some(initial) => Ok(Grammar::new(initial, rules)),
            None => Err(String::from("Missing declaration of the initial symbol")),
        }
    }
}

impl<N, T, W> FromStr for Rule<N, T, W>
where
    N: FromStr,
    N::Err: Debug,
    T: FromStr,
    T::Err: Debug,
    W: FromStr + One,
    W::Err: Debug,
{
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match parse_rule(s.as_bytes()) {
            IResult::Done(_, ref rule) if rule.composition.is_empty() => {
                Err(format!("Empty right-hand side in \'{}\'", s))
            }
            IResult::Done(_, rule) => Ok(rule),
            _ => Err(format!("Could not parse \'{}\'", s)),
        }
    }
}

/// Parses a terminal or nonterminal token, either undelimited (excluding the
/// notation's separator symbols) or `'"'`-delimited with `'\\'` escapes.
fn parse_token<A>(input: &[u8]) -> IResult<&[u8], A>
where
    A: FromStr,
    A::Err: Debug,
{
    named!(
        token<&str>,
        map_res!(
            alt!(
                delimited!(
                    char!('\"'),
                    escaped!(is_not!("\\\""), '\\', anychar),
                    char!('\"')
                ) | is_not!(" \t\"-→,;)]#%")
            ),
            from_utf8
        )
    );

    token(input).map(|x| x.parse().unwrap())
}

fn parse_initial<N>(input: &[u8]) -> IResult<&[u8], N>
where
    N: FromStr,
    N::Err: Debug,
{
    do_parse!(
        input,
        tag!("initial:")
            >> take_while!(is_space)
            >> tag!("[")
            >> take_while!(is_space)
            >> symbol: parse_token
            >> take_while!(is_space)
            >> tag!("]")
            >> (symbol)
    )
}

fn parse_rule<N, T, W>(input: &[u8]) -> IResult<&[u8], Rule<N, T, W>>
where
    N: FromStr,
    N::Err: Debug,
    T: FromStr,
    T::Err: Debug,
    W: FromStr + One,
    W::Err: Debug,
{
    do_parse!(
        input,
        head: parse_token
            >> take_while!(is_space)
            >> alt!(tag!("→") | tag!("->") | tag!("=>"))
            >> take_while!(is_space)
            >> composition: parse_composition
            >> take_while!(is_space)
            >> weight_o:
                opt!(complete!(do_parse!(
                    tag!("#")
                        >> take_while!(is_space)
                        >> weight_s: map_res!(is_not!(" "), from_utf8)
                        >> weight: expr_res!(weight_s.parse())
                        >> (weight)
                )))
            >> take_while!(is_space)
            >> alt!(eof!() | preceded!(tag!("%"), take_while!(|_| true)))
            >> (Rule {
                head: Symbol::Nonterminal(head),
                composition: composition,
                weight: weight_o.unwrap_or_else(W::one),
            })
    )
}

fn parse_symbol<N, T>(input: &[u8]) -> IResult<&[u8], Symbol<N, T>>
where
    N: FromStr,
    N::Err: Debug,
    T: FromStr,
    T::Err: Debug,
{
    alt!(
        input,
        do_parse!(
            tag!("Nt")
                >> take_while1!(is_space)
                >> token: parse_token
                >> (Symbol::Nonterminal(token))
        ) | do_parse!(
            tag!("T")
                >> take_while1!(is_space)
                >> token: parse_token
                >> (Symbol::Terminal(token))
        )
    )
}

fn parse_composition<N, T>(input: &[u8]) -> IResult<&[u8], Vec<Symbol<N, T>>>
where
    N: FromStr,
    N::Err: Debug,
    T: FromStr,
    T::Err: Debug,
{
    do_parse!(
        input,
        tag!("[")
            >> take_while!(is_space)
            >> symbols:
                separated_list!(
                    do_parse!(
                        take_while!(is_space) >> tag!(",") >> take_while!(is_space) >> (())
                    ),
                    parse_symbol
                )
            >> take_while!(is_space)
            >> tag!("]")
            >> (symbols)
    )
}
