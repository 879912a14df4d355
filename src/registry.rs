/// A country and the pages its events are collected from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Country {
    pub name: &'static str,
    pub glyph: &'static str,
    pub sources: &'static [&'static str],
}

/// Glyph shown for countries the registry does not know.
pub const FALLBACK_GLYPH: &str = "🏝️";

static CARIBBEAN: &[Country] = &[
    Country {
        name: "Antigua and Barbuda",
        glyph: "🇦🇬",
        sources: &[
            "https://www.antiguanice.com/events/",
            "https://antiguabarbuda.org/events",
            "https://www.antiguacarnivals.com/",
        ],
    },
    Country {
        name: "Bahamas",
        glyph: "🇧🇸",
        sources: &[
            "https://www.bahamas.com/events",
            "https://www.bahamas.gov.bs/news",
            "https://junkanoonews.com/",
        ],
    },
    Country {
        name: "Barbados",
        glyph: "🇧🇧",
        sources: &[
            "https://www.visitbarbados.org/events-and-festivals",
            "https://cropoverworld.com/",
            "https://gisbarbados.gov.bb/news/",
        ],
    },
    Country {
        name: "Belize",
        glyph: "🇧🇿",
        sources: &[
            "https://www.travelbelize.org/events/",
            "https://www.belizenews.com/events/",
            "https://www.government.bz/news/",
        ],
    },
    Country {
        name: "Cuba",
        glyph: "🇨🇺",
        sources: &[
            "https://www.cubatravel.cu/en/events",
            "http://www.cubadebate.cu/",
            "https://www.habanafestival.cu/",
        ],
    },
    Country {
        name: "Dominica",
        glyph: "🇩🇲",
        sources: &[
            "https://dominica.dm/events/",
            "https://www.discoverdominica.com/events",
            "https://gov.dm/news",
        ],
    },
    Country {
        name: "Dominican Republic",
        glyph: "🇩🇴",
        sources: &[
            "https://www.godominicanrepublic.com/events/",
            "https://www.presidencia.gob.do/noticias",
            "https://carnavaldominicano.com/",
        ],
    },
    Country {
        name: "Grenada",
        glyph: "🇬🇩",
        sources: &[
            "https://www.grenadagrenadines.com/events/",
            "https://spicemasgrenada.com/",
            "https://www.gov.gd/news",
        ],
    },
    Country {
        name: "Guyana",
        glyph: "🇬🇾",
        sources: &[
            "https://www.guyana.org/events/",
            "https://dpi.gov.gy/",
            "https://guyanachronicle.com/events/",
        ],
    },
    Country {
        name: "Haiti",
        glyph: "🇭🇹",
        sources: &[
            "https://www.haititourisme.org/events",
            "https://www.haitilibre.com/en/",
            "https://carnavaldehaiti.com/",
        ],
    },
    Country {
        name: "Jamaica",
        glyph: "🇯🇲",
        sources: &[
            "https://www.visitjamaica.com/events/",
            "https://reggaesumfest.com/",
            "https://jis.gov.jm/news/",
        ],
    },
    Country {
        name: "Puerto Rico",
        glyph: "🇵🇷",
        sources: &[
            "https://www.discoverpuertorico.com/events",
            "https://www.sanjuanciudadpatrimonio.com/events",
            "https://www.gobierno.pr/noticias/",
        ],
    },
    Country {
        name: "Saint Kitts and Nevis",
        glyph: "🇰🇳",
        sources: &[
            "https://www.stkittstourism.kn/events/",
            "https://www.gov.kn/news",
            "https://sugarmascarnivals.com/",
        ],
    },
    Country {
        name: "Saint Lucia",
        glyph: "🇱🇨",
        sources: &[
            "https://www.stlucia.org/en/events/",
            "https://www.govt.lc/news",
            "https://www.stluciajazz.org/",
            "https://carnivalsaintlucia.com/events/",
            "https://www.stlucia.org/en/experiences/festivals-events/",
        ],
    },
    Country {
        name: "Saint Vincent and the Grenadines",
        glyph: "🇻🇨",
        sources: &[
            "https://discoversvg.com/events/",
            "https://www.gov.vc/news",
            "https://vincy-mas.com/",
        ],
    },
    Country {
        name: "Suriname",
        glyph: "🇸🇷",
        sources: &[
            "https://www.suriname.nu/events/",
            "https://www.gov.sr/nieuws/",
            "https://surinametourism.sr/events/",
        ],
    },
    Country {
        name: "Trinidad and Tobago",
        glyph: "🇹🇹",
        sources: &[
            "https://www.gotrinidadandtobago.com/events/",
            "https://www.ncctt.org/",
            "https://www.gov.tt/news/",
            "https://www.trinidadcarnival.com/",
        ],
    },
];

/// A read-only table of countries. Lookups are case-insensitive on the country name.
#[derive(Debug, Clone, Copy)]
pub struct Registry {
    countries: &'static [Country],
}

impl Registry {
    pub const fn new(countries: &'static [Country]) -> Self {
        Registry { countries }
    }

    pub fn caribbean() -> Self {
        Registry::new(CARIBBEAN)
    }

    pub fn countries(&self) -> &'static [Country] {
        self.countries
    }

    pub fn get(&self, name: &str) -> Option<&'static Country> {
        let wanted = name.split_whitespace().collect::<Vec<_>>().join(" ");
        self.countries
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(&wanted))
    }

    pub fn glyph_for(&self, name: &str) -> &'static str {
        self.get(name).map(|c| c.glyph).unwrap_or(FALLBACK_GLYPH)
    }
}
