use anyhow::{Context, Result};
use glob::glob;
use tracing::warn;

/// Expande los patrones de entrada a la lista de splits (un archivo por
/// split, un map por archivo). Cada patrón se expande en orden alfabético;
/// un patrón sin coincidencias sólo genera un aviso.
pub fn expand_inputs(patterns: &[String]) -> Result<Vec<String>> {
    let mut files = Vec::new();

    for pattern in patterns {
        let mut matched = 0usize;
        let entries =
            glob(pattern).with_context(|| format!("patrón de entrada inválido: {}", pattern))?;

        for path in entries.flatten() {
            if path.is_file() {
                files.push(path.to_string_lossy().to_string());
                matched += 1;
            }
        }

        if matched == 0 {
            warn!(pattern = %pattern, "el patrón no coincide con ningún archivo");
        }
    }

    Ok(files)
}
