/*****************************************************************************************[dimacs.rs]
Copyright (c) 2003-2006, Niklas Een, Niklas Sorensson (MiniSat)
Copyright (c) 2007-2010, Niklas Sorensson (MiniSat)

Permission is hereby granted, free of charge, to any person obtaining a copy of this software and
associated documentation files (the "Software"), to deal in the Software without restriction,
including without limitation the rights to use, copy, modify, merge, publish, distribute,
sublicense, and/or sell copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:

The above copyright notice and this permission notice shall be included in all copies or
substantial portions of the Software.

THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING BUT
NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM,
DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT
OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.
**************************************************************************************************/

use {
    crate::{
        interface::SolverInterface,
        {lbool, Lit},
    },
    std::io::{self, BufRead},
};

/// What one input line turned out to be.
enum Item {
    /// A plain disjunction, terminated by `0`.
    Clause,
    /// A cardinality line `l₁ … lₘ <= k # d`.
    Leq { bound: i32, dst: Lit },
    /// A cardinality line `l₁ … lₘ >= k # d`.
    Geq { bound: i32, dst: Lit },
}

/// `parse(input, solver)` adds the content of `input` to the solver.
///
/// Besides plain clauses, a line of literals may end in `<= k # d` or
/// `>= k # d`, adding the cardinality constraint reified on the literal
/// `d`. Variables are created on demand up to the maximum id seen.
///
/// ## Params
/// - `is_strict` if true, will fail if the number of clauses does not match the declared header
/// - `incremental` if true, accept the [.icnf format](http://www.siert.nl/icnf/)
pub fn parse<S: SolverInterface, R: BufRead>(
    input: &mut R,
    solver: &mut S,
    is_strict: bool,
    incremental: bool,
) -> io::Result<()> {
    let mut lits = vec![];
    let mut num_clauses = 0;
    let mut num_read_clauses = 0;
    loop {
        skip_whitespace(input)?;
        let ch = next_byte(input)?;
        if ch == Some(b'p') {
            if incremental {
                skip_line(input)?;
                continue;
            }
            let mut header = [0; 5];
            input.read_exact(&mut header)?;
            if &header != b"p cnf" {
                return parse_error(format!("PARSE ERROR! Unexpected char: p"));
            }
            parse_int(input)?; // number of variables, unused
            num_clauses = parse_int(input)?;
        } else if ch == Some(b'c') {
            skip_line(input)?;
        } else if incremental && ch == Some(b'a') {
            input.consume(1); // skip 'a'
            match read_clause(input, solver, &mut lits)? {
                Item::Clause => (),
                _ => {
                    return parse_error(format!(
                        "PARSE ERROR! Inequality in incremental assumption line"
                    ))
                }
            }
            debug!(
                "solve with assumptions {:?} (ok: {})",
                &lits,
                solver.is_ok()
            );
            solver.simplify();
            let res = solver.solve_limited(&lits); // solve under assumptions
            match res {
                x if x == lbool::TRUE => println!("SAT"),
                x if x == lbool::FALSE => println!("UNSAT"),
                x => {
                    debug_assert_eq!(x, lbool::UNDEF);
                    println!("UNKNOWN")
                }
            }
        } else if let Some(_) = ch {
            match read_clause(input, solver, &mut lits)? {
                Item::Clause => {
                    solver.add_clause_reuse(&mut lits);
                }
                Item::Leq { bound, dst } => {
                    solver.add_leq_assign_reuse(&mut lits, bound, dst);
                }
                Item::Geq { bound, dst } => {
                    solver.add_geq_assign_reuse(&mut lits, bound, dst);
                }
            }
            num_read_clauses += 1;
        } else {
            break;
        }
    }
    if is_strict && !incremental && num_clauses != num_read_clauses {
        return parse_error(format!(
            "PARSE ERROR! DIMACS header mismatch: wrong number of clauses"
        ));
    }
    Ok(())
}

fn read_clause<S: SolverInterface, R: BufRead>(
    input: &mut R,
    solver: &mut S,
    lits: &mut Vec<Lit>,
) -> io::Result<Item> {
    lits.clear();
    loop {
        skip_whitespace(input)?;
        let ch = next_byte(input)?;
        if ch == Some(b'<') || ch == Some(b'>') {
            // parse an inequality tail: `<= k # d` or `>= k # d`
            let op = ch.unwrap();
            input.consume(1);
            if next_byte(input)? != Some(b'=') {
                return parse_error(format!("PARSE ERROR! Unexpected char in inequality"));
            }
            input.consume(1);
            let bound = parse_int(input)?;
            skip_whitespace(input)?;
            if next_byte(input)? != Some(b'#') {
                return parse_error(format!("PARSE ERROR! Unexpected char in inequality assign"));
            }
            input.consume(1);
            let dst = parse_int(input)?;
            if dst == 0 {
                return parse_error(format!("PARSE ERROR! Zero destination in inequality"));
            }
            let dst = Lit::new(solver.var_of_int((dst.abs() - 1) as u32), dst > 0);
            return Ok(if op == b'<' {
                Item::Leq { bound, dst }
            } else {
                Item::Geq { bound, dst }
            });
        }

        let parsed_lit = parse_int(input)?;
        if parsed_lit == 0 {
            return Ok(Item::Clause);
        }
        let var = (parsed_lit.abs() - 1) as u32;
        let lit = Lit::new(solver.var_of_int(var), parsed_lit > 0);
        lits.push(lit);
    }
}

fn parse_int<R: BufRead>(input: &mut R) -> io::Result<i32> {
    skip_whitespace(input)?;
    let ch = next_byte(input)?;
    let neg = if ch == Some(b'+') || ch == Some(b'-') {
        input.consume(1);
        ch == Some(b'-')
    } else {
        false
    };
    if let Some(ch) = next_byte(input)? {
        if !(b'0' <= ch && ch <= b'9') {
            return parse_error(format!("PARSE ERROR! Unexpected char: {}", ch as char));
        }
    } else {
        return parse_error(format!("PARSE ERROR! Unexpected EOF"));
    };
    let mut val = 0;
    while let Some(ch) = next_byte(input)? {
        if !(b'0' <= ch && ch <= b'9') {
            break;
        }
        input.consume(1);
        val = val * 10 + (ch - b'0') as i32;
    }
    if neg {
        Ok(-val)
    } else {
        Ok(val)
    }
}

#[inline(always)]
fn is_whitespace(ch: Option<u8>) -> bool {
    ch.map(|ch| b'\x09' <= ch && ch <= b'\x0d' || ch == b' ')
        .unwrap_or(false)
}

fn skip_whitespace<R: BufRead>(input: &mut R) -> io::Result<()> {
    while is_whitespace(next_byte(input)?) {
        input.consume(1);
    }
    Ok(())
}

fn skip_line<R: BufRead>(input: &mut R) -> io::Result<()> {
    loop {
        if let Some(ch) = next_byte(input)? {
            input.consume(1);
            if ch == b'\n' {
                return Ok(());
            }
        } else {
            return Ok(());
        }
    }
}

fn next_byte<R: BufRead>(input: &mut R) -> io::Result<Option<u8>> {
    Ok(input.fill_buf()?.first().map(|&ch| ch))
}

fn parse_error<T>(message: String) -> io::Result<T> {
    Err(io::Error::new(io::ErrorKind::InvalidInput, message))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{BasicSolver, SolverInterface};

    fn solver_of(input: &str) -> BasicSolver {
        let mut s = BasicSolver::default();
        parse(&mut input.as_bytes(), &mut s, false, false).expect("parse ok");
        s
    }

    #[test]
    fn test_parse_plain_cnf() {
        let mut s = solver_of("c a comment\np cnf 3 2\n1 2 0\n-1 3 0\n");
        assert_eq!(s.num_vars(), 3);
        assert_eq!(s.solve_limited(&[]), lbool::TRUE);
    }

    #[test]
    fn test_parse_autocreates_vars() {
        let s = solver_of("1 -7 0\n");
        assert_eq!(s.num_vars(), 7);
    }

    #[test]
    fn test_parse_leq_line() {
        // (x1 + x2 + x3 <= 1) <-> x4, x4 asserted, and at least one of x1..x3
        let mut s = solver_of("p cnf 4 3\n1 2 3 <= 1 # 4\n4 0\n1 2 3 0\n");
        assert_eq!(s.solve_limited(&[]), lbool::TRUE);
        let n_true = (0..3)
            .filter(|&i| s.value_var(crate::Var::from_idx(i)) == lbool::TRUE)
            .count();
        assert_eq!(n_true, 1);
    }

    #[test]
    fn test_parse_geq_line() {
        // (x1 + x2 >= 2) <-> x3, with x3 true: both x1 and x2 must hold
        let mut s = solver_of("1 2 >= 2 # 3\n3 0\n");
        assert_eq!(s.solve_limited(&[]), lbool::TRUE);
        assert_eq!(s.value_lit(Lit::new(crate::Var::from_idx(0), true)), lbool::TRUE);
        assert_eq!(s.value_lit(Lit::new(crate::Var::from_idx(1), true)), lbool::TRUE);
    }

    #[test]
    fn test_parse_strict_header_mismatch() {
        let mut s = BasicSolver::default();
        let r = parse(&mut "p cnf 2 3\n1 2 0\n".as_bytes(), &mut s, true, false);
        assert!(r.is_err());
    }

    #[test]
    fn test_parse_bad_inequality() {
        let mut s = BasicSolver::default();
        let r = parse(&mut "1 2 <= 1 4 0\n".as_bytes(), &mut s, false, false);
        assert!(r.is_err());
    }
}
