//! On-disk tables exchanged between the pipelines and with TARQUIN.

mod csv_tables;
mod naming;

pub use csv_tables::{
    parse_quantification_csv,
    read_metabolite_csv,
    read_metabolite_csv_file,
    read_shift_matrix,
    title_line,
    write_metabolite_csv,
    write_shift_matrix,
    MatrixKind,
    MetaboliteTable,
};
pub use naming::{
    input_stem,
    output_path,
    output_paths,
    write_outputs,
    CORRELATIONS_SUFFIX,
    P_VALUES_SUFFIX,
};
