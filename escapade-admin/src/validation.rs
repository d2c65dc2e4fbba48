use validator::{ValidationError, ValidationErrors};

/// Returns the message of the first failing field, walking the fields in
/// the given order so the same input always reports the same problem.
pub fn first_violation(errors: &ValidationErrors, field_order: &[&str]) -> String {
    let field_errors: Vec<(String, &Vec<ValidationError>)> = errors
        .field_errors()
        .into_iter()
        .map(|(field, errors)| (field.to_string(), errors))
        .collect();

    let mut remaining: Vec<&str> = field_errors
        .iter()
        .map(|(field, _)| field.as_str())
        .filter(|field| !field_order.contains(field))
        .collect();
    remaining.sort();

    field_order
        .iter()
        .copied()
        .chain(remaining)
        .find_map(|field| {
            let (_, errors) = field_errors.iter().find(|(f, _)| f == field)?;
            let first = errors.first()?;

            Some(
                first
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{field} is invalid")),
            )
        })
        .unwrap_or_else(|| "Invalid input".to_string())
}
