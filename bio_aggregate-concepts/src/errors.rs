use core::fmt::Display;
use std::error::Error;

macro_rules! define_errors {
    ($(($err_name: ident, $err_descr: expr)),+) => {
        $(
            #[doc = $err_descr]
            #[derive(Debug,Clone,PartialEq)]
            pub struct $err_name(
                #[doc = "Error message associated with "]
                #[doc = stringify!($err_name)]
                #[doc = " error type."]
                pub String,
            );

            impl Display for $err_name {
                fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                    write!(f, "{}", self.0)
                }
            }

            impl Error for $err_name {}
        )+
    }
}

define_errors!(
    (
        PreconditionViolation,
        "Operation invoked on an unbound or structurally invalid cell or aggregate"
    ),
    (NotFound, "Identifier is not present in the live set of cells"),
    (
        IndexOutOfRange,
        "Substrate index exceeds the number of registered substrates"
    ),
    (
        InvalidState,
        "Operation is not permitted in the current state of the aggregate"
    ),
    (CalcError, "General Calculation Error"),
    (SetupError, "Occurs during setup of a new aggregate"),
    (
        RngError,
        "Can occur when generating distributions or drawing samples from them."
    )
);

impl From<CalcError> for SetupError {
    fn from(value: CalcError) -> Self {
        SetupError(format!("{}", value))
    }
}

impl NotFound {
    /// Standard message for a missing cell identifier.
    pub fn cell(id: &crate::CellIdentifier) -> Self {
        NotFound(format!("cell {id} is not part of the aggregate"))
    }
}

#[test]
fn error_messages_are_displayed_verbatim() {
    let error = NotFound::cell(&crate::CellIdentifier(7));
    assert_eq!(format!("{error}"), "cell #7 is not part of the aggregate");
    let error = IndexOutOfRange("substrate 3 of 2".to_owned());
    assert_eq!(error.to_string(), "substrate 3 of 2");
}
