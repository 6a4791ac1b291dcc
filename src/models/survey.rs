//! The survey: field catalogue, in-progress answers and the complete record.
//!
//! `SurveyForm` holds what the user has answered so far, with `None` as the
//! unanswered sentinel. A `SurveyRecord` only exists once every prediction
//! field is answered, and is the single row handed to the pipeline.

use std::str::FromStr;

use serde::Serialize;

use super::enums::*;
use super::SchemaError;
use crate::pipeline::{Frame, Value};

/// Pipeline input columns, in form order.
pub const SCHEMA_COLUMNS: [&str; 13] = [
    "idade",
    "genero",
    "historico_familiar",
    "faf",
    "mtrans",
    "scc",
    "tue",
    "favc",
    "fcvc",
    "caec",
    "ch20",
    "ncp",
    "calc",
];

/// Form key of the optional name control.
pub const NAME_FIELD: &str = "nome";
pub const NAME_MAX_CHARS: usize = 50;

// ═══════════════════════════════════════════════════════════
// Field catalogue
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    PersonalData,
    PersonalRoutine,
    EatingHabits,
}

impl Section {
    pub const ALL: [Section; 3] = [
        Section::PersonalData,
        Section::PersonalRoutine,
        Section::EatingHabits,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Section::PersonalData => "Dados Pessoais",
            Section::PersonalRoutine => "Rotina Pessoal",
            Section::EatingHabits => "Hábitos Alimentares",
        }
    }
}

/// One selectable answer: pipeline code plus display label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChoiceOption {
    pub code: Value,
    pub label: &'static str,
    #[serde(skip)]
    pub form_value: String,
}

fn options_of<C: Choice>() -> Vec<ChoiceOption> {
    C::ALL
        .iter()
        .map(|c| ChoiceOption {
            code: c.code(),
            label: c.label(),
            form_value: c.form_value(),
        })
        .collect()
}

/// How a field is answered.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "control", rename_all = "snake_case")]
pub enum Control {
    Number { min: i64, max: i64 },
    Select { options: Vec<ChoiceOption> },
}

/// The 13 prediction fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Idade,
    Genero,
    HistoricoFamiliar,
    Faf,
    Mtrans,
    Scc,
    Tue,
    Favc,
    Fcvc,
    Caec,
    Ch20,
    Ncp,
    Calc,
}

impl Field {
    pub const ALL: [Field; 13] = [
        Field::Idade,
        Field::Genero,
        Field::HistoricoFamiliar,
        Field::Faf,
        Field::Mtrans,
        Field::Scc,
        Field::Tue,
        Field::Favc,
        Field::Fcvc,
        Field::Caec,
        Field::Ch20,
        Field::Ncp,
        Field::Calc,
    ];

    /// Pipeline column name, also the form key.
    pub fn column(&self) -> &'static str {
        match self {
            Field::Idade => "idade",
            Field::Genero => "genero",
            Field::HistoricoFamiliar => "historico_familiar",
            Field::Faf => "faf",
            Field::Mtrans => "mtrans",
            Field::Scc => "scc",
            Field::Tue => "tue",
            Field::Favc => "favc",
            Field::Fcvc => "fcvc",
            Field::Caec => "caec",
            Field::Ch20 => "ch20",
            Field::Ncp => "ncp",
            Field::Calc => "calc",
        }
    }

    pub fn from_column(column: &str) -> Option<Field> {
        Field::ALL.into_iter().find(|f| f.column() == column)
    }

    /// Label shown above the control.
    pub fn question(&self) -> &'static str {
        match self {
            Field::Idade => "Idade",
            Field::Genero => "Gênero",
            Field::HistoricoFamiliar => "Possui histórico familiar de sobrepeso?",
            Field::Faf => "Com qual frequência você pratica atividade física?",
            Field::Mtrans => "Qual é o seu meio de transporte principal?",
            Field::Scc => "Você monitora o seu consumo de calorias?",
            Field::Tue => "Tempo de uso de dispositivos tecnológicos?",
            Field::Favc => "Você consome alimentos de alta caloria?",
            Field::Fcvc => "Com que frequência você consome vegetais?",
            Field::Caec => "Você ingere comida entre refeições?",
            Field::Ch20 => "Qual é o seu consumo diário de água?",
            Field::Ncp => "Quantas refeições principais você faz por dia?",
            Field::Calc => "Você consome álcool?",
        }
    }

    pub fn section(&self) -> Section {
        match self {
            Field::Idade | Field::Genero | Field::HistoricoFamiliar => Section::PersonalData,
            Field::Faf | Field::Mtrans | Field::Scc | Field::Tue => Section::PersonalRoutine,
            Field::Favc | Field::Fcvc | Field::Caec | Field::Ch20 | Field::Ncp | Field::Calc => {
                Section::EatingHabits
            }
        }
    }

    pub fn control(&self) -> Control {
        let options = match self {
            Field::Idade => {
                return Control::Number {
                    min: Age::MIN,
                    max: Age::MAX,
                }
            }
            Field::Genero => options_of::<Gender>(),
            Field::HistoricoFamiliar | Field::Scc | Field::Favc => options_of::<YesNo>(),
            Field::Faf => options_of::<ActivityFrequency>(),
            Field::Mtrans => options_of::<Transport>(),
            Field::Tue => options_of::<ScreenTime>(),
            Field::Fcvc => options_of::<VegetableFrequency>(),
            Field::Caec | Field::Calc => options_of::<Frequency>(),
            Field::Ch20 => options_of::<WaterIntake>(),
            Field::Ncp => options_of::<MainMeals>(),
        };
        Control::Select { options }
    }
}

// ═══════════════════════════════════════════════════════════
// Answers in progress
// ═══════════════════════════════════════════════════════════

/// Answers collected so far. `None` means unanswered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurveyForm {
    pub nome: Option<String>,
    pub idade: Option<Age>,
    pub genero: Option<Gender>,
    pub historico_familiar: Option<YesNo>,
    pub faf: Option<ActivityFrequency>,
    pub mtrans: Option<Transport>,
    pub scc: Option<YesNo>,
    pub tue: Option<ScreenTime>,
    pub favc: Option<YesNo>,
    pub fcvc: Option<VegetableFrequency>,
    pub caec: Option<Frequency>,
    pub ch20: Option<WaterIntake>,
    pub ncp: Option<MainMeals>,
    pub calc: Option<Frequency>,
}

fn parse_answer<T: FromStr<Err = SchemaError>>(
    field: Field,
    raw: &str,
) -> Result<Option<T>, SchemaError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse().map(Some).map_err(|e: SchemaError| e.with_field(field.column()))
}

impl SurveyForm {
    /// Set one prediction field from its submitted text. Blank clears it.
    pub fn set(&mut self, field: Field, raw: &str) -> Result<(), SchemaError> {
        match field {
            Field::Idade => self.idade = parse_answer(field, raw)?,
            Field::Genero => self.genero = parse_answer(field, raw)?,
            Field::HistoricoFamiliar => self.historico_familiar = parse_answer(field, raw)?,
            Field::Faf => self.faf = parse_answer(field, raw)?,
            Field::Mtrans => self.mtrans = parse_answer(field, raw)?,
            Field::Scc => self.scc = parse_answer(field, raw)?,
            Field::Tue => self.tue = parse_answer(field, raw)?,
            Field::Favc => self.favc = parse_answer(field, raw)?,
            Field::Fcvc => self.fcvc = parse_answer(field, raw)?,
            Field::Caec => self.caec = parse_answer(field, raw)?,
            Field::Ch20 => self.ch20 = parse_answer(field, raw)?,
            Field::Ncp => self.ncp = parse_answer(field, raw)?,
            Field::Calc => self.calc = parse_answer(field, raw)?,
        }
        Ok(())
    }

    pub fn set_name(&mut self, raw: &str) -> Result<(), SchemaError> {
        let name = raw.trim();
        if name.chars().count() > NAME_MAX_CHARS {
            return Err(SchemaError::TooLong {
                field: NAME_FIELD.into(),
                max: NAME_MAX_CHARS,
            });
        }
        self.nome = (!name.is_empty()).then(|| name.to_string());
        Ok(())
    }

    /// Build a form from submitted `(key, value)` pairs.
    ///
    /// Every pair is applied; rejected ones are returned alongside the form
    /// so the caller can report all of them at once.
    pub fn from_pairs<'a, I>(pairs: I) -> (SurveyForm, Vec<SchemaError>)
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut form = SurveyForm::default();
        let mut errors = Vec::new();
        for (key, raw) in pairs {
            let result = if key == NAME_FIELD {
                form.set_name(raw)
            } else {
                match Field::from_column(key) {
                    Some(field) => form.set(field, raw),
                    None => Err(SchemaError::UnknownField(key.to_string())),
                }
            };
            if let Err(e) = result {
                errors.push(e);
            }
        }
        (form, errors)
    }

    /// Pipeline code of an answered field.
    pub fn code(&self, field: Field) -> Option<Value> {
        match field {
            Field::Idade => self.idade.map(|a| Value::Int(a.years())),
            Field::Genero => self.genero.map(|c| c.code()),
            Field::HistoricoFamiliar => self.historico_familiar.map(|c| c.code()),
            Field::Faf => self.faf.map(|c| c.code()),
            Field::Mtrans => self.mtrans.map(|c| c.code()),
            Field::Scc => self.scc.map(|c| c.code()),
            Field::Tue => self.tue.map(|c| c.code()),
            Field::Favc => self.favc.map(|c| c.code()),
            Field::Fcvc => self.fcvc.map(|c| c.code()),
            Field::Caec => self.caec.map(|c| c.code()),
            Field::Ch20 => self.ch20.map(|c| c.code()),
            Field::Ncp => self.ncp.map(|c| c.code()),
            Field::Calc => self.calc.map(|c| c.code()),
        }
    }

    /// Unanswered prediction fields, in form order.
    pub fn missing_fields(&self) -> Vec<Field> {
        Field::ALL
            .into_iter()
            .filter(|f| self.code(*f).is_none())
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// The complete record, or the list of unanswered fields.
    pub fn to_record(&self) -> Result<SurveyRecord, Vec<Field>> {
        match self.try_record() {
            Some(record) => Ok(record),
            None => Err(self.missing_fields()),
        }
    }

    fn try_record(&self) -> Option<SurveyRecord> {
        Some(SurveyRecord {
            idade: self.idade?,
            genero: self.genero?,
            historico_familiar: self.historico_familiar?,
            faf: self.faf?,
            mtrans: self.mtrans?,
            scc: self.scc?,
            tue: self.tue?,
            favc: self.favc?,
            fcvc: self.fcvc?,
            caec: self.caec?,
            ch20: self.ch20?,
            ncp: self.ncp?,
            calc: self.calc?,
        })
    }
}

// ═══════════════════════════════════════════════════════════
// Complete record
// ═══════════════════════════════════════════════════════════

/// Fully answered survey. The name is deliberately absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SurveyRecord {
    pub idade: Age,
    pub genero: Gender,
    pub historico_familiar: YesNo,
    pub faf: ActivityFrequency,
    pub mtrans: Transport,
    pub scc: YesNo,
    pub tue: ScreenTime,
    pub favc: YesNo,
    pub fcvc: VegetableFrequency,
    pub caec: Frequency,
    pub ch20: WaterIntake,
    pub ncp: MainMeals,
    pub calc: Frequency,
}

impl SurveyRecord {
    /// One-row frame in schema order.
    pub fn to_frame(&self) -> Frame {
        Frame::from_pairs([
            ("idade", Value::Int(self.idade.years())),
            ("genero", self.genero.code()),
            ("historico_familiar", self.historico_familiar.code()),
            ("faf", self.faf.code()),
            ("mtrans", self.mtrans.code()),
            ("scc", self.scc.code()),
            ("tue", self.tue.code()),
            ("favc", self.favc.code()),
            ("fcvc", self.fcvc.code()),
            ("caec", self.caec.code()),
            ("ch20", self.ch20.code()),
            ("ncp", self.ncp.code()),
            ("calc", self.calc.code()),
        ])
    }
}
