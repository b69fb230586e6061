//! Example transit feedback written to an empty dataset on first run.

pub struct SeedComment {
    pub text: &'static str,
    pub author: &'static str,
}

impl SeedComment {
    pub fn email(&self) -> String {
        format!("{}@ejemplo.com", self.author.to_lowercase())
    }
}

pub const SEED_COMMENTS: &[SeedComment] = &[
    SeedComment {
        text: "El transporte público es muy lento en horas punta",
        author: "Carlos",
    },
    SeedComment {
        text: "Los buses nuevos han mejorado bastante el servicio",
        author: "Ana",
    },
    SeedComment {
        text: "Siempre hay mucha demora y desorden en los paraderos",
        author: "Luis",
    },
    SeedComment {
        text: "Me gusta que ahora las unidades estén más limpias",
        author: "María",
    },
    SeedComment {
        text: "El pasaje es caro para la calidad del servicio",
        author: "Pedro",
    },
    SeedComment {
        text: "Excelente servicio en la nueva línea de metro",
        author: "Laura",
    },
    SeedComment {
        text: "Los conductores son muy amables y profesionales",
        author: "Javier",
    },
    SeedComment {
        text: "Falta más frecuencia en los horarios nocturnos",
        author: "Sofía",
    },
    SeedComment {
        text: "La aplicación móvil funciona muy bien",
        author: "David",
    },
    SeedComment {
        text: "Me siento seguro viajando en el transporte público",
        author: "Elena",
    },
];
