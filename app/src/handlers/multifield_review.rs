use crate::platform::{Field, Platform};
use common::AppError;

/// Shows a fixed review whose value contains a line break. The answer is always an empty
/// success, whatever the user chooses.
pub fn handler_multifield_review<P: Platform>(platform: &mut P) -> Result<(), AppError> {
    let fields = [Field {
        name: "Field title",
        value: "value\nhidden part of value 1 2 3 4 5 6 7 8 9",
    }];
    let approved = platform.review(&["Example with newline"], &fields);
    log::debug!("multifield review closed, approved: {}", approved);
    Ok(())
}
