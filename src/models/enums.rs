use std::str::FromStr;

use serde::Serialize;

use super::SchemaError;
use crate::pipeline::Value;

/// A closed answer set: pipeline code plus Portuguese display label.
pub trait Choice: Copy + FromStr<Err = SchemaError> + 'static {
    const ALL: &'static [Self];

    /// Cell value the pipeline was fitted on.
    fn code(&self) -> Value;

    fn label(&self) -> &'static str;

    /// The code as submitted by an HTML control.
    fn form_value(&self) -> String;
}

/// Macro to generate a text-coded choice with as_str + FromStr
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal : $label:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl Choice for $name {
            const ALL: &'static [Self] = &[$(Self::$variant),+];

            fn code(&self) -> Value {
                Value::from(self.as_str())
            }

            fn label(&self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }

            fn form_value(&self) -> String {
                self.as_str().to_string()
            }
        }

        impl FromStr for $name {
            type Err = SchemaError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(SchemaError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }
    };
}

/// Macro to generate an integer-coded choice with code + FromStr
macro_rules! code_enum {
    ($name:ident { $($variant:ident => $code:literal : $label:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_i64(&self) -> i64 {
                match self {
                    $(Self::$variant => $code),+
                }
            }
        }

        impl Choice for $name {
            const ALL: &'static [Self] = &[$(Self::$variant),+];

            fn code(&self) -> Value {
                Value::Int(self.as_i64())
            }

            fn label(&self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }

            fn form_value(&self) -> String {
                self.as_i64().to_string()
            }
        }

        impl TryFrom<i64> for $name {
            type Error = SchemaError;

            fn try_from(code: i64) -> Result<Self, Self::Error> {
                match code {
                    $($code => Ok(Self::$variant)),+,
                    _ => Err(SchemaError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: code.to_string(),
                    }),
                }
            }
        }

        impl FromStr for $name {
            type Err = SchemaError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let invalid = || SchemaError::InvalidEnum {
                    field: stringify!($name).into(),
                    value: s.into(),
                };
                let trimmed = s.trim();
                let code = match trimmed.parse::<i64>() {
                    Ok(code) => code,
                    Err(_) => match trimmed.parse::<f64>() {
                        Ok(v) if v.is_finite() && v.fract() == 0.0 => v as i64,
                        _ => return Err(invalid()),
                    },
                };
                Self::try_from(code)
            }
        }

        impl Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_i64(self.as_i64())
            }
        }
    };
}

str_enum!(Gender {
    Female => "feminino" : "Feminino",
    Male => "masculino" : "Masculino",
});

str_enum!(YesNo {
    Yes => "sim" : "Sim",
    No => "nao" : "Não",
});

str_enum!(Transport {
    Car => "carro" : "Automóvel",
    PublicTransport => "transporte_publico" : "Transporte Público",
    Walking => "caminhando" : "Caminhando",
    Motorbike => "moto" : "Moto",
    Bicycle => "bicicleta" : "Bicicleta",
});

// Shared by caec and calc.
str_enum!(Frequency {
    Never => "nunca" : "Nunca",
    Sometimes => "as_vezes" : "Às vezes",
    Frequently => "frequentemente" : "Frequentemente",
    Always => "sempre" : "Sempre",
});

code_enum!(ActivityFrequency {
    Never => 0 : "Nunca",
    OneToTwoDays => 1 : "1 a 2 dias por semana",
    TwoToFourDays => 2 : "2 a 4 dias por semana",
    FourToFiveDays => 3 : "4 ou 5 dias por semana",
});

code_enum!(ScreenTime {
    UpToTwoHours => 0 : "0-2 horas",
    ThreeToFiveHours => 1 : "3-5 horas",
    OverFiveHours => 2 : "Mais que 5 horas",
});

code_enum!(VegetableFrequency {
    Never => 0 : "Nunca",
    Sometimes => 1 : "Às vezes",
    Always => 2 : "Sempre",
});

code_enum!(WaterIntake {
    UnderOneLiter => 1 : "Menos que 1 litro",
    OneToTwoLiters => 2 : "1 a 2 litros",
    OverTwoLiters => 3 : "Mais que 2 litros",
});

code_enum!(MainMeals {
    OneOrTwo => 0 : "Entre 1 e 2 refeições",
    Three => 1 : "3 refeições",
    MoreThanThree => 2 : "Mais de 3 refeições",
});

/// Age in whole years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Age(u8);

impl Age {
    pub const MIN: i64 = 1;
    pub const MAX: i64 = 100;

    pub fn new(years: i64) -> Result<Self, SchemaError> {
        if !(Self::MIN..=Self::MAX).contains(&years) {
            return Err(SchemaError::OutOfRange {
                field: "Age".into(),
                min: Self::MIN,
                max: Self::MAX,
                value: years,
            });
        }
        Ok(Self(years as u8))
    }

    pub fn years(&self) -> i64 {
        i64::from(self.0)
    }
}

impl FromStr for Age {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let years = match trimmed.parse::<i64>() {
            Ok(years) => years,
            // Number inputs may post "25.0".
            Err(_) => match trimmed.parse::<f64>() {
                Ok(v) if v.is_finite() && v.fract() == 0.0 => v as i64,
                _ => {
                    return Err(SchemaError::NotANumber {
                        field: "Age".into(),
                        value: s.into(),
                    })
                }
            },
        };
        Self::new(years)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_round_trip() {
        for (variant, s) in [
            (Transport::Car, "carro"),
            (Transport::PublicTransport, "transporte_publico"),
            (Transport::Walking, "caminhando"),
            (Transport::Motorbike, "moto"),
            (Transport::Bicycle, "bicicleta"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(Transport::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn display_labels_are_portuguese() {
        assert_eq!(Transport::PublicTransport.label(), "Transporte Público");
        assert_eq!(YesNo::No.label(), "Não");
        assert_eq!(Frequency::Sometimes.label(), "Às vezes");
        assert_eq!(MainMeals::Three.label(), "3 refeições");
        assert_eq!(WaterIntake::UnderOneLiter.label(), "Menos que 1 litro");
    }

    #[test]
    fn code_enums_parse_from_form_values() {
        assert_eq!(MainMeals::from_str("1").unwrap(), MainMeals::Three);
        assert_eq!(ActivityFrequency::from_str("0").unwrap(), ActivityFrequency::Never);
        assert_eq!(WaterIntake::try_from(3).unwrap(), WaterIntake::OverTwoLiters);
        assert_eq!(VegetableFrequency::from_str("2.0").unwrap(), VegetableFrequency::Always);
        assert!(VegetableFrequency::from_str("1.5").is_err());
    }

    #[test]
    fn code_zero_is_a_real_answer() {
        assert_eq!(VegetableFrequency::Never.code(), Value::Int(0));
        assert_eq!(ScreenTime::UpToTwoHours.form_value(), "0");
    }

    #[test]
    fn out_of_vocabulary_is_rejected() {
        assert!(matches!(
            Transport::from_str("aviao"),
            Err(SchemaError::InvalidEnum { value, .. }) if value == "aviao"
        ));
        assert!(Gender::from_str("Feminino").is_err());
        assert!(WaterIntake::from_str("0").is_err());
        assert!(ScreenTime::from_str("muito").is_err());
    }

    #[test]
    fn choice_sets_match_schema() {
        assert_eq!(Gender::ALL.len(), 2);
        assert_eq!(Transport::ALL.len(), 5);
        assert_eq!(Frequency::ALL.len(), 4);
        assert_eq!(ActivityFrequency::ALL.len(), 4);
        let water: Vec<_> = WaterIntake::ALL.iter().map(WaterIntake::as_i64).collect();
        assert_eq!(water, vec![1, 2, 3]);
    }

    #[test]
    fn codes_serialize_as_pipeline_values() {
        assert_eq!(serde_json::to_value(Transport::Car).unwrap(), "carro");
        assert_eq!(serde_json::to_value(MainMeals::MoreThanThree).unwrap(), 2);
        assert_eq!(serde_json::to_value(Age::new(40).unwrap()).unwrap(), 40);
    }

    #[test]
    fn age_range_is_enforced() {
        assert_eq!(Age::from_str("1").unwrap().years(), 1);
        assert_eq!(Age::from_str(" 100 ").unwrap().years(), 100);
        assert_eq!(Age::from_str("25.0").unwrap().years(), 25);
        assert!(matches!(Age::from_str("0"), Err(SchemaError::OutOfRange { value: 0, .. })));
        assert!(Age::from_str("101").is_err());
        assert!(matches!(Age::from_str("25.5"), Err(SchemaError::NotANumber { .. })));
        assert!(Age::from_str("vinte").is_err());
    }
}
