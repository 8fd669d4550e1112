use uuid::Uuid;

/// Generate a globally unique DICOM UID.
///
/// UIDs are derived from a random UUID under the `2.25` OID arc
/// (ISO/IEC 9834-8), which keeps them well under the 64 character
/// limit without requiring a registered organization root.
pub fn generate_uid() -> String {
    format!("2.25.{}", Uuid::new_v4().as_u128())
}
