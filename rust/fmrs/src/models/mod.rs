mod arrays;
mod metabolites;
mod paradigm;
mod window;

pub use arrays::Array2D;
pub use metabolites::{
    MetaboliteMatrix,
    QuantifiedRow,
    RESERVED_COLUMNS,
};
pub use paradigm::{
    smooth,
    trim,
    ParadigmConfig,
};
pub use window::{
    plan,
    plan_all,
    WindowSize,
    MAX_WINDOW_SIZE,
    MIN_WINDOW_SIZE,
};
