use crate::error::{CliError, Result};
use std::fs;
use std::path::Path;
use swaplock::ContractRecord;

pub fn ensure_file_exists(path: &Path) -> Result<()> {
    if !path.exists() || !path.is_file() {
        return Err(CliError::FileNotFound(path.display().to_string()));
    }
    Ok(())
}

pub fn ensure_file_not_exists(path: &Path) -> Result<()> {
    if path.exists() {
        return Err(CliError::FileExists(path.display().to_string()));
    }
    Ok(())
}

pub fn read_record(path: &Path) -> Result<ContractRecord> {
    ensure_file_exists(path)?;
    let text = fs::read_to_string(path)?;
    log::debug!("Read contract record: {}", path.display());
    Ok(ContractRecord::from_json(&text)?)
}

pub fn write_record(path: &Path, record: &ContractRecord) -> Result<()> {
    ensure_file_not_exists(path)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, record.to_json()?)?;
    log::info!("Wrote contract record: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use swaplock::{ByteInput, Contract, ContractParams, record::KeyRecord};

    const CLAIMER: &str = "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798";
    const REFUNDER: &str = "02c6047f9441ed7d6d3045406e95c07cd85c778e4b8cef3ca7abac09b95c709ee5";

    fn record() -> ContractRecord {
        let params = ContractParams::new(
            ByteInput::from(&[0x5a; 32]),
            ByteInput::from(CLAIMER),
            ByteInput::from(REFUNDER),
            144,
        )
        .unwrap();
        let contract = Contract::build(params, bitcoin::Network::Regtest).unwrap();
        let claimer = hex::decode(CLAIMER).unwrap();
        let refunder = hex::decode(REFUNDER).unwrap();
        ContractRecord::new(
            &contract,
            None,
            KeyRecord::public(&claimer.try_into().unwrap()),
            KeyRecord::public(&refunder.try_into().unwrap()),
        )
    }

    #[test]
    fn test_write_then_read_record() {
        let dir = std::env::temp_dir().join(format!("swaplock-cli-test-{}", std::process::id()));
        let path = dir.join("record.json");
        let _ = fs::remove_dir_all(&dir);

        write_record(&path, &record()).unwrap();
        assert_eq!(read_record(&path).unwrap(), record());
        assert!(matches!(
            write_record(&path, &record()),
            Err(CliError::FileExists(_))
        ));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_record() {
        let path = std::env::temp_dir().join("swaplock-cli-test-missing.json");
        assert!(matches!(read_record(&path), Err(CliError::FileNotFound(_))));
    }
}
