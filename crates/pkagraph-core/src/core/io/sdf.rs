use super::traits::StructureFile;
use crate::core::chem::valence::assign_implicit_hydrogens;
use crate::core::models::atom::Atom;
use crate::core::models::bond::BondOrder;
use crate::core::models::element::Element;
use crate::core::models::molecule::{Molecule, MoleculeBuilder, MoleculeError};
use crate::core::models::properties::PropertyValue;
use nalgebra::Point3;
use std::io::{self, BufRead};
use thiserror::Error;
use tracing::debug;

const RECORD_TERMINATOR: &str = "$$$$";
const PROPERTY_BLOCK_END: &str = "M  END";
const CHARGE_PROPERTY: &str = "M  CHG";

#[derive(Debug, Error)]
pub enum SdfError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse { line: usize, kind: SdfParseErrorKind },
    #[error("Invalid connectivity on line {line}: {source}")]
    Connectivity {
        line: usize,
        #[source]
        source: MoleculeError,
    },
}

#[derive(Debug, Error)]
pub enum SdfParseErrorKind {
    #[error("Record ended before the header and counts line were complete")]
    TruncatedHeader,
    #[error("Record ended before all {expected} {section} lines were read")]
    TruncatedBlock {
        section: &'static str,
        expected: usize,
    },
    #[error("V3000 connection tables are not supported")]
    V3000Unsupported,
    #[error("Invalid integer in field '{field}' (value: '{value}')")]
    InvalidInt { field: &'static str, value: String },
    #[error("Invalid float in field '{field}' (value: '{value}')")]
    InvalidFloat { field: &'static str, value: String },
    #[error("Unknown element symbol '{0}'")]
    UnknownElement(String),
    #[error("Unsupported bond type code {0}")]
    UnsupportedBondType(u8),
    #[error("Atom {index} referenced by a property line does not exist")]
    AtomOutOfRange { index: usize },
    #[error("Malformed data item header '{0}'")]
    InvalidDataHeader(String),
}

type Line = (usize, String);

// Column-based field extraction with a whitespace-token fallback for loosely formatted files.
fn field<'a>(line: &'a str, start: usize, end: usize, token: usize) -> Option<&'a str> {
    line.get(start..end.min(line.len()))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .or_else(|| line.split_whitespace().nth(token))
}

fn parse_int<T: std::str::FromStr>(
    line: &Line,
    raw: Option<&str>,
    name: &'static str,
) -> Result<T, SdfError> {
    let value = raw.unwrap_or("");
    value.parse().map_err(|_| SdfError::Parse {
        line: line.0,
        kind: SdfParseErrorKind::InvalidInt {
            field: name,
            value: value.to_string(),
        },
    })
}

fn parse_float(line: &Line, raw: Option<&str>, name: &'static str) -> Result<f64, SdfError> {
    let value = raw.unwrap_or("");
    value.parse().map_err(|_| SdfError::Parse {
        line: line.0,
        kind: SdfParseErrorKind::InvalidFloat {
            field: name,
            value: value.to_string(),
        },
    })
}

// CTfile atom-block charge codes.
fn charge_from_code(code: u8) -> i8 {
    match code {
        1 => 3,
        2 => 2,
        3 => 1,
        5 => -1,
        6 => -2,
        7 => -3,
        _ => 0,
    }
}

/// Reader for MDL SD files (V2000 connection tables with data items).
///
/// Terminal explicit hydrogens are folded into their heavy neighbor, so atom indices count the
/// remaining atoms in file order. Data items are kept verbatim as text.
pub struct SdfFile;

impl StructureFile for SdfFile {
    type Error = SdfError;

    fn read_from(reader: &mut impl BufRead) -> Result<Vec<Molecule>, Self::Error> {
        let mut molecules = Vec::new();
        let mut record: Vec<Line> = Vec::new();

        for (line_num, line_res) in reader.lines().enumerate() {
            let line = line_res?;
            if line.trim_end() == RECORD_TERMINATOR {
                molecules.push(parse_record(&record)?);
                record.clear();
            } else {
                record.push((line_num + 1, line));
            }
        }

        if record.iter().any(|(_, l)| !l.trim().is_empty()) {
            molecules.push(parse_record(&record)?);
        }

        debug!(records = molecules.len(), "Finished reading SD file.");
        Ok(molecules)
    }
}

fn parse_record(lines: &[Line]) -> Result<Molecule, SdfError> {
    let last_line = lines.last().map_or(0, |(n, _)| *n);
    if lines.len() < 4 {
        return Err(SdfError::Parse {
            line: last_line,
            kind: SdfParseErrorKind::TruncatedHeader,
        });
    }

    let counts = &lines[3];
    if counts.1.contains("V3000") {
        return Err(SdfError::Parse {
            line: counts.0,
            kind: SdfParseErrorKind::V3000Unsupported,
        });
    }
    let atom_count: usize = parse_int(counts, field(&counts.1, 0, 3, 0), "atom count")?;
    let bond_count: usize = parse_int(counts, field(&counts.1, 3, 6, 1), "bond count")?;

    let atom_start = 4;
    let bond_start = atom_start + atom_count;
    let block_end = bond_start + bond_count;
    if lines.len() < bond_start {
        return Err(SdfError::Parse {
            line: last_line,
            kind: SdfParseErrorKind::TruncatedBlock {
                section: "atom",
                expected: atom_count,
            },
        });
    }
    if lines.len() < block_end {
        return Err(SdfError::Parse {
            line: last_line,
            kind: SdfParseErrorKind::TruncatedBlock {
                section: "bond",
                expected: bond_count,
            },
        });
    }

    let mut builder = MoleculeBuilder::new(lines[0].1.trim());
    for line in &lines[atom_start..bond_start] {
        builder.push_atom(parse_atom(line)?);
    }
    for line in &lines[bond_start..block_end] {
        parse_bond(line, &mut builder)?;
    }

    let rest = &lines[block_end..];
    let data_start = parse_property_block(rest, &mut builder, atom_count)?;
    let folded = builder.fold_terminal_hydrogens();
    if folded > 0 {
        debug!(
            molecule = lines[0].1.trim(),
            folded, "Folded explicit hydrogen atoms into their heavy neighbors."
        );
    }
    parse_data_items(&rest[data_start..], &mut builder)?;

    let mut molecule = builder.build();
    assign_implicit_hydrogens(&mut molecule);
    Ok(molecule)
}

fn parse_atom(line: &Line) -> Result<Atom, SdfError> {
    let raw = &line.1;
    let x = parse_float(line, field(raw, 0, 10, 0), "x")?;
    let y = parse_float(line, field(raw, 10, 20, 1), "y")?;
    let z = parse_float(line, field(raw, 20, 30, 2), "z")?;
    let symbol = field(raw, 31, 34, 3).unwrap_or("");
    let element: Element = symbol.parse().map_err(|_| SdfError::Parse {
        line: line.0,
        kind: SdfParseErrorKind::UnknownElement(symbol.to_string()),
    })?;
    let charge_code: u8 = match field(raw, 36, 39, 5) {
        Some(code) => parse_int(line, Some(code), "charge")?,
        None => 0,
    };
    Ok(Atom::new(element)
        .with_charge(charge_from_code(charge_code))
        .with_position(Point3::new(x, y, z)))
}

fn parse_bond(line: &Line, builder: &mut MoleculeBuilder) -> Result<(), SdfError> {
    let raw = &line.1;
    let first: usize = parse_int(line, field(raw, 0, 3, 0), "first atom")?;
    let second: usize = parse_int(line, field(raw, 3, 6, 1), "second atom")?;
    let code: u8 = parse_int(line, field(raw, 6, 9, 2), "bond type")?;
    let order = BondOrder::from_ctfile(code).ok_or(SdfError::Parse {
        line: line.0,
        kind: SdfParseErrorKind::UnsupportedBondType(code),
    })?;

    // CTfile atom numbers are 1-based; 0 can never be valid.
    let begin = first.checked_sub(1).unwrap_or(usize::MAX);
    let end = second.checked_sub(1).unwrap_or(usize::MAX);
    builder
        .add_bond(begin, end, order)
        .map_err(|source| SdfError::Connectivity {
            line: line.0,
            source,
        })?;

    if order == BondOrder::Aromatic {
        for index in [begin, end] {
            if let Some(atom) = builder.atom_mut(index) {
                atom.aromatic = true;
            }
        }
    }
    Ok(())
}

/// Consumes the properties block up to `M  END` and returns the number of lines it spans.
fn parse_property_block(
    lines: &[Line],
    builder: &mut MoleculeBuilder,
    atom_count: usize,
) -> Result<usize, SdfError> {
    let mut charges_reset = false;
    for (offset, line) in lines.iter().enumerate() {
        let raw = line.1.trim_end();
        if raw.starts_with(PROPERTY_BLOCK_END) {
            return Ok(offset + 1);
        }
        if !raw.starts_with(CHARGE_PROPERTY) {
            continue;
        }

        // The first M  CHG line supersedes every charge given in the atom block.
        if !charges_reset {
            for index in 0..atom_count {
                if let Some(atom) = builder.atom_mut(index) {
                    atom.formal_charge = 0;
                }
            }
            charges_reset = true;
        }

        let tokens: Vec<&str> = raw[CHARGE_PROPERTY.len()..].split_whitespace().collect();
        let entries: usize = parse_int(line, tokens.first().copied(), "charge entry count")?;
        for pair in tokens.iter().skip(1).take(entries * 2).collect::<Vec<_>>().chunks(2) {
            let atom_number: usize = parse_int(line, pair.first().map(|s| **s), "charged atom")?;
            let charge: i8 = parse_int(line, pair.get(1).map(|s| **s), "charge value")?;
            let atom = atom_number
                .checked_sub(1)
                .and_then(|index| builder.atom_mut(index))
                .ok_or(SdfError::Parse {
                    line: line.0,
                    kind: SdfParseErrorKind::AtomOutOfRange { index: atom_number },
                })?;
            atom.formal_charge = charge;
        }
    }
    Ok(lines.len())
}

fn parse_data_items(lines: &[Line], builder: &mut MoleculeBuilder) -> Result<(), SdfError> {
    let mut current: Option<(String, Vec<&str>)> = None;

    for line in lines {
        let raw = line.1.trim_end();
        if raw.starts_with('>') {
            if let Some((name, values)) = current.take() {
                builder.property(&name, PropertyValue::Text(values.join("\n")));
            }
            let name = raw
                .find('<')
                .zip(raw.rfind('>'))
                .filter(|(open, close)| open < close)
                .map(|(open, close)| raw[open + 1..close].to_string())
                .ok_or_else(|| SdfError::Parse {
                    line: line.0,
                    kind: SdfParseErrorKind::InvalidDataHeader(raw.to_string()),
                })?;
            current = Some((name, Vec::new()));
        } else if raw.is_empty() {
            if let Some((name, values)) = current.take() {
                builder.property(&name, PropertyValue::Text(values.join("\n")));
            }
        } else if let Some((_, values)) = current.as_mut() {
            values.push(raw);
        }
    }

    if let Some((name, values)) = current {
        builder.property(&name, PropertyValue::Text(values.join("\n")));
    }
    Ok(())
}
