//! Python module definition.

use pyo3::prelude::*;

use super::augmentation;

#[pymodule]
fn _volaug(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Combiner and batch driver
    m.add_function(wrap_pyfunction!(augmentation::combine_aug, m)?)?;
    m.add_function(wrap_pyfunction!(augmentation::aug_batch, m)?)?;
    m.add_function(wrap_pyfunction!(augmentation::random_decisions, m)?)?;

    // Single-sample transforms
    m.add_function(wrap_pyfunction!(augmentation::flip3d, m)?)?;
    m.add_function(wrap_pyfunction!(augmentation::one_class_flip, m)?)?;
    m.add_function(wrap_pyfunction!(augmentation::rotation3d, m)?)?;
    m.add_function(wrap_pyfunction!(augmentation::shift3d, m)?)?;
    m.add_function(wrap_pyfunction!(augmentation::swirl3d, m)?)?;
    m.add_function(wrap_pyfunction!(augmentation::brightness, m)?)?;
    m.add_function(wrap_pyfunction!(augmentation::elastic, m)?)?;
    m.add_function(wrap_pyfunction!(augmentation::tumor_removal, m)?)?;

    m.add("DEFAULT_WORKERS", crate::config::DEFAULT_WORKERS)?;
    m.add(
        "TECHNIQUES",
        crate::Technique::ALL
            .iter()
            .map(|t| t.name())
            .collect::<Vec<_>>(),
    )?;

    Ok(())
}
