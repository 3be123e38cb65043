use crate::error::Result;
use std::io::Write;

/// Write the reduced energy series in the layout the plotting tools read:
/// two `#` metadata lines ending at the tail correction, then `<step> <energy>`
/// rows every `interval` steps (1-based step numbers).
pub fn write_energy_series<W: Write>(
    writer: &mut W,
    initial_pair_energy: f64,
    tail_correction: f64,
    energies: &[f64],
    interval: usize,
) -> Result<()> {
    writeln!(writer, "# total pair initial: {}", initial_pair_energy)?;
    writeln!(writer, "# tail correction: {}", tail_correction)?;
    let interval = interval.max(1);
    for (step, energy) in energies
        .iter()
        .enumerate()
        .map(|(i, e)| (i + 1, e))
        .filter(|(step, _)| step % interval == 0)
    {
        writeln!(writer, "{} {}", step, energy)?;
    }
    Ok(())
}
