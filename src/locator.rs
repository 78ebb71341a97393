use crate::error::Result;
use crate::surface::{FieldProbe, FormSurface};

/// An interactive field found inside a question container.
pub struct LocatedField<F> {
    /// Position within the discovered sequence, not within all containers.
    pub ordinal: usize,
    pub probe: FieldProbe,
    pub handle: F,
}

/// Collect the first `input_selector` match inside each `container_selector`
/// match, in document order. Containers without one, or whose lookup fails,
/// are skipped.
pub async fn locate_fields<S: FormSurface>(
    surface: &S,
    container_selector: &str,
    input_selector: &str,
) -> Result<Vec<LocatedField<S::Field>>> {
    let containers = surface.find_all(container_selector).await?;
    let mut fields = Vec::with_capacity(containers.len());

    for (index, container) in containers.iter().enumerate() {
        let handle = match surface.find_within(container, input_selector).await {
            Ok(Some(handle)) => handle,
            Ok(None) => {
                tracing::debug!(container = index, "container has no input, skipping");
                continue;
            }
            Err(e) => {
                tracing::debug!(container = index, error = %e, "container lookup failed, skipping");
                continue;
            }
        };
        // A field that cannot be probed still gets filled by position.
        let probe = match surface.probe(&handle).await {
            Ok(probe) => probe,
            Err(e) => {
                tracing::debug!(container = index, error = %e, "field probe failed");
                FieldProbe::default()
            }
        };
        fields.push(LocatedField {
            ordinal: fields.len(),
            probe,
            handle,
        });
    }

    tracing::info!(
        containers = containers.len(),
        fields = fields.len(),
        "located form fields"
    );
    Ok(fields)
}
