// src/common/timefmt.rs

// Horários de reserva trafegam como "HH:MM" na API (o serde padrão do chrono
// exige segundos). Aceitamos "HH:MM:SS" na entrada por tolerância.

use chrono::NaiveTime;
use serde::{Deserialize, Deserializer, Serializer};

const FORMAT: &str = "%H:%M";

pub fn serialize<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&time.format(FORMAT).to_string())
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    NaiveTime::parse_from_str(&value, FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(&value, "%H:%M:%S"))
        .map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveTime;
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize)]
    struct Wrapper {
        #[serde(with = "super")]
        time: NaiveTime,
    }

    #[test]
    fn aceita_hora_sem_segundos() {
        let w: Wrapper = serde_json::from_str(r#"{"time":"10:30"}"#).unwrap();
        assert_eq!(w.time, NaiveTime::from_hms_opt(10, 30, 0).unwrap());
    }

    #[test]
    fn aceita_hora_com_segundos() {
        let w: Wrapper = serde_json::from_str(r#"{"time":"10:30:00"}"#).unwrap();
        assert_eq!(w.time, NaiveTime::from_hms_opt(10, 30, 0).unwrap());
    }

    #[test]
    fn serializa_sem_segundos() {
        let w = Wrapper { time: NaiveTime::from_hms_opt(9, 0, 0).unwrap() };
        assert_eq!(serde_json::to_string(&w).unwrap(), r#"{"time":"09:00"}"#);
    }
}
