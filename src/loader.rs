// CSV loader
// Reads the six reference tables from a data directory. Any missing or
// malformed table is a DataLoadFailure: the engine refuses to start.

use crate::error::{LoadError, LoadResult};
use crate::store::{ReferenceStore, ReferenceTables};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// One table and the file names it may be stored under (first existing wins)
#[derive(Debug, Clone)]
pub struct TableSource {
    pub table: &'static str,
    pub file_names: &'static [&'static str],
}

pub const COMUNI: TableSource = TableSource {
    table: "comuni",
    file_names: &["comuni.csv"],
};

pub const COLLEGI_CAMERA: TableSource = TableSource {
    table: "collegi_camera",
    file_names: &["collegi_camera.csv"],
};

pub const COLLEGI_SENATO: TableSource = TableSource {
    table: "collegi_senato",
    file_names: &["collegi_senato.csv"],
};

pub const CONTATTI_CAMERA: TableSource = TableSource {
    table: "contatti_camera",
    file_names: &["contatti_camera.csv", "contatti_enhanced.csv", "test_contatti.csv"],
};

pub const CONTATTI_SENATO: TableSource = TableSource {
    table: "contatti_senato",
    file_names: &["contatti_senato.csv", "contatti_senato_clean.csv"],
};

pub const CONTATTI_EU: TableSource = TableSource {
    table: "contatti_eu",
    file_names: &["contatti_eu.csv"],
};

impl TableSource {
    /// First candidate file that exists under `dir`
    pub fn locate(&self, dir: &Path) -> LoadResult<PathBuf> {
        let candidates: Vec<PathBuf> = self.file_names.iter().map(|f| dir.join(f)).collect();

        if let Some(found) = candidates.iter().find(|p| p.is_file()) {
            return Ok(found.clone());
        }

        Err(LoadError::MissingTable {
            table: self.table,
            candidates,
        })
    }

    /// Locate and deserialize every row
    pub fn read<T: DeserializeOwned>(&self, dir: &Path) -> LoadResult<Vec<T>> {
        let path = self.locate(dir)?;
        let rows = read_csv(self.table, &path)?;
        debug!(table = self.table, path = %path.display(), rows = rows.len(), "table read");
        Ok(rows)
    }
}

/// Deserialize a whole CSV file
pub fn read_csv<T: DeserializeOwned>(table: &'static str, path: &Path) -> LoadResult<Vec<T>> {
    let malformed = |source: csv::Error| LoadError::Malformed {
        table,
        path: path.to_path_buf(),
        source,
    };

    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_path(path)
        .map_err(malformed)?;

    let mut rows = Vec::new();
    for result in rdr.deserialize() {
        rows.push(result.map_err(malformed)?);
    }

    Ok(rows)
}

/// Read all six tables from a data directory
pub fn load_tables(dir: &Path) -> LoadResult<ReferenceTables> {
    info!(dir = %dir.display(), "loading reference tables from CSV");

    Ok(ReferenceTables {
        municipalities: COMUNI.read(dir)?,
        lower_districts: COLLEGI_CAMERA.read(dir)?,
        upper_districts: COLLEGI_SENATO.read(dir)?,
        lower_members: CONTATTI_CAMERA.read(dir)?,
        upper_members: CONTATTI_SENATO.read(dir)?,
        eu_members: CONTATTI_EU.read(dir)?,
    })
}

/// Read the data directory and build the store
pub fn load_store(dir: &Path) -> LoadResult<ReferenceStore> {
    ReferenceStore::build(load_tables(dir)?)
}

#[cfg(test)]
pub(crate) mod testdata {
    use std::fs;
    use std::path::Path;

    pub const COMUNI_CSV: &str = "istat_comune,comune,provincia,regione\n\
058091,Roma,RM,Lazio\n\
015146,Milano,MI,Lombardia\n\
002113,Romagnano Sesia,NO,Piemonte\n";

    pub const COLLEGI_CAMERA_CSV: &str = "istat_comune,collegio_camera_id,collegio_camera_nome\n\
058091,LAZIO-P01,Lazio 1 - Plurinominale 01\n\
015146,LOMBARDIA-P01,Lombardia 1 - Plurinominale 01\n";

    pub const COLLEGI_SENATO_CSV: &str = "istat_comune,collegio_senato_id,collegio_senato_nome\n\
058091,LAZIO-U01,Lazio - Uninominale 01\n";

    pub const CONTATTI_CAMERA_CSV: &str = "nome,cognome,gruppo_partito,collegio,email_istituzionale,form_contatti_url\n\
Mario,Rossi,Gruppo Misto,LAZIO 1 - P01,rossi_m@camera.it,https://example.org/form/1\n\
Luca,Neri,Lega,LOMBARDIA 1 - P01,neri_l@camera.it,\n";

    pub const CONTATTI_SENATO_CSV: &str = "nome,cognome,gruppo_partito,regione,email_istituzionale,sito_ufficiale\n\
Anna,Bianchi,PD,Lazio,anna.bianchi@senato.it,\n";

    pub const CONTATTI_EU_CSV: &str = "nome,cognome,gruppo_partito,circoscrizione_eu,email_istituzionale,form_contatti_url\n\
Elena,Ferri,S&D,Centrale,elena.ferri@europarl.europa.eu,\n\
Franco,Sala,EPP,Nord-occidentale,franco.sala@europarl.europa.eu,\n";

    /// Write a complete data directory
    pub fn write_data_dir(dir: &Path) {
        fs::write(dir.join("comuni.csv"), COMUNI_CSV).unwrap();
        fs::write(dir.join("collegi_camera.csv"), COLLEGI_CAMERA_CSV).unwrap();
        fs::write(dir.join("collegi_senato.csv"), COLLEGI_SENATO_CSV).unwrap();
        fs::write(dir.join("contatti_camera.csv"), CONTATTI_CAMERA_CSV).unwrap();
        fs::write(dir.join("contatti_senato.csv"), CONTATTI_SENATO_CSV).unwrap();
        fs::write(dir.join("contatti_eu.csv"), CONTATTI_EU_CSV).unwrap();
    }
}
