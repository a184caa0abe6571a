// SQLite persistence for the reference tables
// One database file instead of six CSVs. Rows keep their table order (rowid).

use crate::error::LoadResult;
use crate::model::{
    EuMember, LowerChamberDistrict, LowerChamberMember, Municipality, UpperChamberDistrict,
    UpperChamberMember,
};
use crate::store::{ReferenceStore, ReferenceTables};
use rusqlite::{params, Connection};
use tracing::info;

pub fn setup_database(conn: &Connection) -> LoadResult<()> {
    // Enable WAL mode for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;

    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS comuni (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            istat_comune TEXT UNIQUE NOT NULL,
            comune TEXT NOT NULL,
            provincia TEXT NOT NULL,
            regione TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS collegi_camera (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            istat_comune TEXT NOT NULL,
            collegio_camera_id TEXT NOT NULL,
            collegio_camera_nome TEXT NOT NULL DEFAULT ''
        );

        CREATE TABLE IF NOT EXISTS collegi_senato (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            istat_comune TEXT NOT NULL,
            collegio_senato_id TEXT NOT NULL,
            collegio_senato_nome TEXT NOT NULL DEFAULT ''
        );

        CREATE TABLE IF NOT EXISTS deputati (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            nome TEXT NOT NULL,
            cognome TEXT NOT NULL,
            gruppo_partito TEXT NOT NULL,
            collegio TEXT NOT NULL,
            email TEXT NOT NULL,
            form_url TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS senatori (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            nome TEXT NOT NULL,
            cognome TEXT NOT NULL,
            gruppo_partito TEXT NOT NULL,
            regione TEXT NOT NULL,
            email TEXT NOT NULL,
            sito_ufficiale TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS mep (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            nome TEXT NOT NULL,
            cognome TEXT NOT NULL,
            gruppo_partito TEXT NOT NULL,
            circoscrizione_eu TEXT NOT NULL,
            email TEXT NOT NULL,
            form_url TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_comuni_nome ON comuni(comune);
        CREATE INDEX IF NOT EXISTS idx_camera_comune ON collegi_camera(istat_comune);
        CREATE INDEX IF NOT EXISTS idx_senato_comune ON collegi_senato(istat_comune);
        CREATE INDEX IF NOT EXISTS idx_senatori_regione ON senatori(regione);
        CREATE INDEX IF NOT EXISTS idx_mep_circoscrizione ON mep(circoscrizione_eu);",
    )?;

    Ok(())
}

/// Replace the stored tables with `tables` in one transaction
pub fn save_tables(conn: &Connection, tables: &ReferenceTables) -> LoadResult<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute_batch(
        "DELETE FROM comuni;
         DELETE FROM collegi_camera;
         DELETE FROM collegi_senato;
         DELETE FROM deputati;
         DELETE FROM senatori;
         DELETE FROM mep;",
    )?;

    {
        let mut stmt = tx.prepare(
            "INSERT INTO comuni (istat_comune, comune, provincia, regione) VALUES (?1, ?2, ?3, ?4)",
        )?;
        for m in &tables.municipalities {
            stmt.execute(params![m.code, m.name, m.province, m.region])?;
        }

        let mut stmt = tx.prepare(
            "INSERT INTO collegi_camera (istat_comune, collegio_camera_id, collegio_camera_nome)
             VALUES (?1, ?2, ?3)",
        )?;
        for d in &tables.lower_districts {
            stmt.execute(params![d.municipality_code, d.district_id, d.district_name])?;
        }

        let mut stmt = tx.prepare(
            "INSERT INTO collegi_senato (istat_comune, collegio_senato_id, collegio_senato_nome)
             VALUES (?1, ?2, ?3)",
        )?;
        for d in &tables.upper_districts {
            stmt.execute(params![d.municipality_code, d.district_id, d.district_name])?;
        }

        let mut stmt = tx.prepare(
            "INSERT INTO deputati (nome, cognome, gruppo_partito, collegio, email, form_url)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )?;
        for m in &tables.lower_members {
            stmt.execute(params![m.name, m.surname, m.party, m.district_label, m.email, m.form_url])?;
        }

        let mut stmt = tx.prepare(
            "INSERT INTO senatori (nome, cognome, gruppo_partito, regione, email, sito_ufficiale)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )?;
        for m in &tables.upper_members {
            stmt.execute(params![m.name, m.surname, m.party, m.region, m.email, m.website])?;
        }

        let mut stmt = tx.prepare(
            "INSERT INTO mep (nome, cognome, gruppo_partito, circoscrizione_eu, email, form_url)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )?;
        for m in &tables.eu_members {
            stmt.execute(params![m.name, m.surname, m.party, m.constituency, m.email, m.form_url])?;
        }
    }

    tx.commit()?;

    info!(
        municipalities = tables.municipalities.len(),
        deputati = tables.lower_members.len(),
        senatori = tables.upper_members.len(),
        mep = tables.eu_members.len(),
        "reference tables saved"
    );

    Ok(())
}

pub fn load_tables(conn: &Connection) -> LoadResult<ReferenceTables> {
    let mut stmt =
        conn.prepare("SELECT istat_comune, comune, provincia, regione FROM comuni ORDER BY id")?;
    let municipalities = stmt
        .query_map([], |row| {
            Ok(Municipality {
                code: row.get(0)?,
                name: row.get(1)?,
                province: row.get(2)?,
                region: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut stmt = conn.prepare(
        "SELECT istat_comune, collegio_camera_id, collegio_camera_nome
         FROM collegi_camera ORDER BY id",
    )?;
    let lower_districts = stmt
        .query_map([], |row| {
            Ok(LowerChamberDistrict {
                municipality_code: row.get(0)?,
                district_id: row.get(1)?,
                district_name: row.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut stmt = conn.prepare(
        "SELECT istat_comune, collegio_senato_id, collegio_senato_nome
         FROM collegi_senato ORDER BY id",
    )?;
    let upper_districts = stmt
        .query_map([], |row| {
            Ok(UpperChamberDistrict {
                municipality_code: row.get(0)?,
                district_id: row.get(1)?,
                district_name: row.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut stmt = conn.prepare(
        "SELECT nome, cognome, gruppo_partito, collegio, email, form_url
         FROM deputati ORDER BY id",
    )?;
    let lower_members = stmt
        .query_map([], |row| {
            Ok(LowerChamberMember {
                name: row.get(0)?,
                surname: row.get(1)?,
                party: row.get(2)?,
                district_label: row.get(3)?,
                email: row.get(4)?,
                form_url: row.get(5)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut stmt = conn.prepare(
        "SELECT nome, cognome, gruppo_partito, regione, email, sito_ufficiale
         FROM senatori ORDER BY id",
    )?;
    let upper_members = stmt
        .query_map([], |row| {
            Ok(UpperChamberMember {
                name: row.get(0)?,
                surname: row.get(1)?,
                party: row.get(2)?,
                region: row.get(3)?,
                email: row.get(4)?,
                website: row.get(5)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut stmt = conn.prepare(
        "SELECT nome, cognome, gruppo_partito, circoscrizione_eu, email, form_url
         FROM mep ORDER BY id",
    )?;
    let eu_members = stmt
        .query_map([], |row| {
            Ok(EuMember {
                name: row.get(0)?,
                surname: row.get(1)?,
                party: row.get(2)?,
                constituency: row.get(3)?,
                email: row.get(4)?,
                form_url: row.get(5)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ReferenceTables {
        municipalities,
        lower_districts,
        upper_districts,
        lower_members,
        upper_members,
        eu_members,
    })
}

/// Load the database and build the store
pub fn load_store(conn: &Connection) -> LoadResult<ReferenceStore> {
    info!("loading reference tables from SQLite");
    ReferenceStore::build(load_tables(conn)?)
}

/// Row count of one table
pub fn count_rows(conn: &Connection, table: &str) -> LoadResult<i64> {
    let count = conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))?;
    Ok(count)
}
