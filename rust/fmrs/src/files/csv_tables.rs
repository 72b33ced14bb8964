use std::io::{
    Read,
    Write,
};
use std::path::Path;
use tracing::debug;

use crate::errors::{
    FmrsError,
    Result,
};
use crate::models::{
    Array2D,
    MetaboliteMatrix,
    QuantifiedRow,
};

/// First line of every file this crate writes.
pub fn title_line(program: &str, version: &str) -> String {
    format!("{} {} Results:", program, version)
}

fn reader_for<R: Read>(rdr: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(rdr)
}

fn writer_for<W: Write>(wtr: W) -> csv::Writer<W> {
    csv::WriterBuilder::new().flexible(true).from_writer(wtr)
}

/// Numeric cell, anything unparseable (empty, text) becomes `NaN`.
fn parse_cell(cell: &str) -> f64 {
    cell.trim().parse::<f64>().unwrap_or(f64::NAN)
}

/// Records of a file with a title line and a names line in front of the data.
struct TitledRecords {
    title: String,
    names: Vec<String>,
    data: Vec<csv::StringRecord>,
}

fn read_titled<R: Read>(rdr: R, context: &str) -> Result<TitledRecords> {
    let mut records = reader_for(rdr).into_records();
    let mut next = |what: &str| -> Result<csv::StringRecord> {
        match records.next() {
            Some(rec) => Ok(rec?),
            None => Err(FmrsError::ParseError {
                msg: format!("{}: missing {} line", context, what),
            }),
        }
    };
    let title = next("title")?.iter().collect::<Vec<_>>().join(",");
    let names: Vec<String> = next("header")?.iter().map(String::from).collect();
    let data = records.collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(TitledRecords { title, names, data })
}

/// Reads the single result row of a TARQUIN `--output_csv` file.
///
/// The file has a title line, a header line with the column names and one
/// line of values.
pub fn parse_quantification_csv(text: &str) -> Result<QuantifiedRow> {
    let parsed = read_titled(text.as_bytes(), "quantification CSV")?;
    let Some(row) = parsed.data.first() else {
        return Err(FmrsError::ParseError {
            msg: "quantification CSV: missing data line".to_string(),
        });
    };
    let values: Vec<f64> = row.iter().map(parse_cell).collect();
    if values.len() != parsed.names.len() {
        return Err(FmrsError::DimensionMismatch {
            expected: parsed.names.len(),
            found: values.len(),
            context: "quantification CSV header vs. values".to_string(),
        });
    }
    Ok(QuantifiedRow {
        names: parsed.names,
        values,
    })
}

/// Metabolite table as stored between the two pipelines.
#[derive(Debug, Clone, PartialEq)]
pub struct MetaboliteTable {
    pub title: String,
    pub matrix: MetaboliteMatrix,
}

pub fn write_metabolite_csv<W: Write>(wtr: W, title: &str, matrix: &MetaboliteMatrix) -> Result<()> {
    let mut wtr = writer_for(wtr);
    wtr.write_record([title])?;
    wtr.write_record(matrix.names())?;
    for row in matrix.rows() {
        wtr.write_record(row.iter().map(|x| x.to_string()))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn read_metabolite_csv<R: Read>(rdr: R) -> Result<MetaboliteTable> {
    let parsed = read_titled(rdr, "metabolite CSV")?;
    let rows: Vec<Vec<f64>> = parsed
        .data
        .iter()
        .map(|rec| rec.iter().map(parse_cell).collect())
        .collect();
    let data = if rows.is_empty() {
        Array2D::filled(0, parsed.names.len(), f64::NAN)
    } else {
        Array2D::new(&rows)?
    };
    debug!(
        "Read metabolite table with {} samples and {} columns",
        data.nrows(),
        data.ncols()
    );
    let matrix = MetaboliteMatrix::new(parsed.names, data)?;
    Ok(MetaboliteTable {
        title: parsed.title,
        matrix,
    })
}

pub fn read_metabolite_csv_file(path: &Path) -> Result<MetaboliteTable> {
    let file = std::fs::File::open(path).map_err(|e| FmrsError::io(e, path))?;
    read_metabolite_csv(std::io::BufReader::new(file))
        .map_err(|e| e.append_to_context(&format!(" ({})", path.display())))
}

/// Which statistic a shift matrix holds, decides the number format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixKind {
    Correlation,
    PValue,
}

impl MatrixKind {
    fn format(self, value: f64) -> String {
        match self {
            MatrixKind::Correlation => format!("{:.6}", value),
            MatrixKind::PValue => format!("{:.6e}", value),
        }
    }
}

/// Writes a `[metabolite, shift]` matrix as one line per shift.
///
/// ```
/// use fmrs::files::{read_shift_matrix, write_shift_matrix, MatrixKind};
/// use fmrs::models::Array2D;
///
/// let names = vec!["NAA".to_string(), "Cr".to_string()];
/// let corr = Array2D::new(vec![vec![0.5, 0.25, 0.125], vec![-1.0, f64::NAN, 0.0]]).unwrap();
/// let mut buf = Vec::new();
/// write_shift_matrix(&mut buf, "fmrs 0.1.0 Results:", &names, &corr, MatrixKind::Correlation).unwrap();
/// let text = String::from_utf8(buf.clone()).unwrap();
/// assert!(text.starts_with("fmrs 0.1.0 Results:\nNAA,Cr\n0.500000,-1.000000\n"));
///
/// let (title, read_names, read) = read_shift_matrix(buf.as_slice()).unwrap();
/// assert_eq!(title, "fmrs 0.1.0 Results:");
/// assert_eq!(read_names, names);
/// assert_eq!(read.get(0, 2), Some(0.125));
/// assert!(read.get(1, 1).unwrap().is_nan());
/// ```
pub fn write_shift_matrix<W: Write>(
    wtr: W,
    title: &str,
    names: &[String],
    matrix: &Array2D,
    kind: MatrixKind,
) -> Result<()> {
    if matrix.nrows() != names.len() {
        return Err(FmrsError::DimensionMismatch {
            expected: names.len(),
            found: matrix.nrows(),
            context: "shift matrix rows vs. metabolite names".to_string(),
        });
    }
    let mut wtr = writer_for(wtr);
    wtr.write_record([title])?;
    wtr.write_record(names)?;
    let by_shift = matrix.transpose();
    for row in by_shift.iter_rows() {
        wtr.write_record(row.iter().map(|&x| kind.format(x)))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Inverse of [`write_shift_matrix`], returns the matrix as `[metabolite, shift]`.
pub fn read_shift_matrix<R: Read>(rdr: R) -> Result<(String, Vec<String>, Array2D)> {
    let parsed = read_titled(rdr, "shift matrix CSV")?;
    let by_shift: Vec<Vec<f64>> = parsed
        .data
        .iter()
        .map(|rec| rec.iter().map(parse_cell).collect())
        .collect();
    let by_shift = if by_shift.is_empty() {
        Array2D::filled(0, parsed.names.len(), f64::NAN)
    } else {
        Array2D::new(&by_shift)?
    };
    if by_shift.ncols() != parsed.names.len() {
        return Err(FmrsError::DimensionMismatch {
            expected: parsed.names.len(),
            found: by_shift.ncols(),
            context: "shift matrix values vs. metabolite names".to_string(),
        });
    }
    Ok((parsed.title, parsed.names, by_shift.transpose()))
}
