use std::str::FromStr;

/// Which names the primitives answer to.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum Locale {
    #[default]
    Polish,
    English,
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pl" | "polish" | "polski" => Ok(Locale::Polish),
            "en" | "english" => Ok(Locale::English),
            other => Err(format!("unknown locale \"{other}\"")),
        }
    }
}

// (id, polish, english). The first alias is the one used in messages.
type Entry = (&'static str, &'static [&'static str], &'static [&'static str]);

#[rustfmt::skip]
const TABLE: &[Entry] = &[
    // Data constructors
    ("word", &["słowo"], &["word"]),
    ("list", &["lista"], &["list"]),
    ("sentence", &["zdanie", "zd"], &["sentence", "se"]),
    ("fput", &["nap"], &["fput"]),
    ("lput", &["nak"], &["lput"]),
    ("combine", &["połącz"], &["combine"]),
    ("reverse", &["wspak"], &["reverse"]),
    ("gensym", &["generujg"], &["gensym"]),
    ("array", &["tablica"], &["array"]),
    ("listtoarray", &["listadotablicy"], &["listtoarray"]),
    ("arraytolist", &["tablicadolisty"], &["arraytolist"]),

    // Selectors
    ("first", &["pierwszy"], &["first"]),
    ("firsts", &["pierwsze"], &["firsts"]),
    ("last", &["ostatni"], &["last"]),
    ("butfirst", &["bezpierw", "bp"], &["butfirst", "bf"]),
    ("butfirsts", &["bezpierwszych", "bps"], &["butfirsts", "bfs"]),
    ("butlast", &["bezost", "bo"], &["butlast", "bl"]),
    ("item", &["element"], &["item"]),
    ("pick", &["los"], &["pick"]),
    ("remove", &["usuń"], &["remove"]),
    ("remdup", &["usuńzdup"], &["remdup"]),

    // Mutators
    ("setitem", &["ustawelement"], &["setitem"]),
    ("push", &["umieść"], &["push"]),
    ("pop", &["zdejmij"], &["pop"]),
    ("queue", &["dokolejki"], &["queue"]),
    ("dequeue", &["zkolejki"], &["dequeue"]),

    // Predicates
    ("wordp", &["słowop", "słowo?"], &["wordp", "word?"]),
    ("listp", &["listap", "lista?"], &["listp", "list?"]),
    ("arrayp", &["tablicap", "tablica?"], &["arrayp", "array?"]),
    ("equalp", &["równep", "równe?"], &["equalp", "equal?"]),
    ("notequalp", &["nierównep", "nierówne?"], &["notequalp", "notequal?"]),
    ("numberp", &["liczbap", "liczba?"], &["numberp", "number?"]),
    ("emptyp", &["pustep", "puste?"], &["emptyp", "empty?"]),
    ("beforep", &["przedp", "przed?"], &["beforep", "before?"]),
    ("substringp", &["podtekstp", "podtekst?"], &["substringp", "substring?"]),
    ("memberp", &["zawierap", "zawiera?", "element?"], &["memberp", "member?"]),

    // Queries
    ("count", &["długość"], &["count"]),
    ("ascii", &["ascii"], &["ascii"]),
    ("char", &["znak"], &["char"]),
    ("lowercase", &["zmałejlitery"], &["lowercase"]),
    ("uppercase", &["zdużejlitery"], &["uppercase"]),
    ("standout", &["standardowewyjście"], &["standout"]),

    // Communication
    ("print", &["pisz"], &["print", "pr"]),
    ("type", &["wpisz"], &["type"]),
    ("show", &["pokaż"], &["show"]),
    ("readword", &["czytajsłowo"], &["readword", "rw"]),
    ("readlist", &["czytajlistę"], &["readlist", "rl"]),
    ("cleartext", &["zmażtekst", "zt"], &["cleartext", "ct"]),

    // Arithmetic
    ("sum", &["suma"], &["sum"]),
    ("difference", &["różnica"], &["difference"]),
    ("minus", &["ujemny"], &["minus"]),
    ("product", &["iloczyn"], &["product"]),
    ("quotient", &["iloraz"], &["quotient"]),
    ("remainder", &["reszta"], &["remainder"]),
    ("modulo", &["mod"], &["modulo"]),
    ("abs", &["abs"], &["abs"]),
    ("int", &["int"], &["int"]),
    ("round", &["zaokr"], &["round"]),
    ("roundaway", &["zaokrąglij"], &["roundaway"]),
    ("sqrt", &["pwk"], &["sqrt"]),
    ("power", &["potęga"], &["power"]),
    ("exp", &["exp"], &["exp"]),
    ("log10", &["log10"], &["log10"]),
    ("ln", &["ln"], &["ln"]),
    ("arctan", &["arctg"], &["arctan"]),
    ("sin", &["sin"], &["sin"]),
    ("cos", &["cos"], &["cos"]),
    ("tan", &["tg"], &["tan"]),
    ("radarctan", &["radarctan"], &["radarctan"]),
    ("radsin", &["radsin"], &["radsin"]),
    ("radcos", &["radcos"], &["radcos"]),
    ("radtan", &["radtan"], &["radtan"]),
    ("iseq", &["isekw"], &["iseq"]),
    ("rseq", &["rsekw"], &["rseq"]),
    ("greaterp", &["większep", "większe?"], &["greaterp", "greater?"]),
    ("greaterequalp", &["większerównep", "większerówne?"], &["greaterequalp", "greaterequal?"]),
    ("lessp", &["mniejszep", "mniejsze?"], &["lessp", "less?"]),
    ("lessequalp", &["mniejszerównep", "mniejszerówne?"], &["lessequalp", "lessequal?"]),
    ("random", &["losowa"], &["random"]),
    ("rerandom", &["startlos"], &["rerandom"]),
    ("form", &["postać"], &["form"]),
    ("bitand", &["biti"], &["bitand"]),
    ("bitor", &["bitlub"], &["bitor"]),
    ("bitxor", &["bitalbo"], &["bitxor"]),
    ("bitnot", &["bitnie"], &["bitnot"]),
    ("ashift", &["przesuńarytmetyczniewlewo"], &["ashift"]),
    ("lshift", &["przesuńlogiczniewlewo"], &["lshift"]),

    // Logic
    ("true", &["prawda"], &["true"]),
    ("false", &["fałsz"], &["false"]),
    ("and", &["i"], &["and"]),
    ("or", &["lub"], &["or"]),
    ("xor", &["albo"], &["xor"]),
    ("not", &["nie"], &["not"]),

    // Graphics
    ("forward", &["naprzód", "np"], &["forward", "fd"]),
    ("back", &["wstecz", "ws"], &["back", "bk"]),
    ("left", &["lewo", "lw"], &["left", "lt"]),
    ("right", &["prawo", "pw"], &["right", "rt"]),
    ("setpos", &["ustalpoz"], &["setpos"]),
    ("setxy", &["ustalpozxy"], &["setxy"]),
    ("setx", &["ustalx"], &["setx"]),
    ("sety", &["ustaly"], &["sety"]),
    ("setheading", &["ustalkierunek", "skieruj"], &["setheading", "seth"]),
    ("home", &["wróć"], &["home"]),
    ("arc", &["łuk", "arc"], &["arc"]),
    ("pos", &["poz"], &["pos"]),
    ("xcor", &["pozx"], &["xcor"]),
    ("ycor", &["pozy"], &["ycor"]),
    ("heading", &["kierunek"], &["heading"]),
    ("towards", &["azymut"], &["towards"]),
    ("showturtle", &["pokażmnie", "pż"], &["showturtle", "st"]),
    ("hideturtle", &["schowajmnie", "sż"], &["hideturtle", "ht"]),
    ("shownp", &["widocznyp", "widoczny?"], &["shownp", "shown?"]),
    ("clean", &["czyść"], &["clean"]),
    ("clearscreen", &["czyśćekran", "cs"], &["clearscreen", "cs"]),
    ("wrap", &["sklej"], &["wrap"]),
    ("window", &["okno"], &["window"]),
    ("fence", &["płot"], &["fence"]),
    ("turtlemode", &["trybżółwia"], &["turtlemode"]),
    ("label", &["wpisztekst"], &["label"]),
    ("setlabelheight", &["ustalwysokośćtekstu"], &["setlabelheight"]),
    ("labelsize", &["rozmiartekstu"], &["labelsize"]),
    ("pendown", &["opuść", "opu"], &["pendown", "pd"]),
    ("penup", &["podnieś", "pod"], &["penup", "pu"]),
    ("pendownp", &["opuszczonyp", "opuszczony?"], &["pendownp", "pendown?"]),
    ("penpaint", &["pisanie"], &["penpaint", "ppt"]),
    ("penerase", &["ścieranie"], &["penerase", "pe"]),
    ("penreverse", &["odwracanie"], &["penreverse", "px"]),
    ("penmode", &["trybpis"], &["penmode"]),
    ("setpencolor", &["ustalkolpis", "ukm"], &["setpencolor", "setpc"]),
    ("pencolor", &["kolpis"], &["pencolor", "pc"]),
    ("setpensize", &["ustalrozmiarpisaka"], &["setpensize"]),
    ("pensize", &["rozmiarpis"], &["pensize"]),

    // Workspace
    ("to", &["oto"], &["to"]),
    ("end", &["już"], &["end"]),
    ("output", &["wynik", "wy"], &["output", "op"]),
    ("stop", &["stopmnie"], &["stop"]),
    (".maybeoutput", &[".możewynik"], &[".maybeoutput"]),
    ("make", &["przypisz"], &["make"]),
    ("name", &["nazwij"], &["name"]),
    ("local", &["lokalna"], &["local"]),
    ("localmake", &["twórzlokalną"], &["localmake"]),
    ("thing", &["niech"], &["thing"]),
    ("global", &["globalna"], &["global"]),
    ("procedurep", &["procedurap", "procedura?"], &["procedurep", "procedure?"]),
    ("primitivep", &["pierwotnep", "pierwotne?"], &["primitivep", "primitive?"]),
    ("definedp", &["określonep", "określone?"], &["definedp", "defined?"]),
    ("namep", &["zmiennap", "zmienna?"], &["namep", "name?"]),
    ("copydef", &["kopiujdef"], &["copydef"]),
    ("text", &["proc"], &["text"]),
    ("pprop", &["przywłaść"], &["pprop"]),
    ("gprop", &["lwł"], &["gprop"]),
    ("remprop", &["uswłaś"], &["remprop"]),
    ("plist", &["właściwość"], &["plist"]),
    ("plistp", &["włp", "wł?"], &["plistp", "plist?"]),
    ("contents", &["zawartości"], &["contents"]),
    ("procedures", &["procedury"], &["procedures"]),
    ("globals", &["globalne"], &["globals"]),
    ("names", &["nazwy"], &["names"]),
    ("plists", &["właściwości"], &["plists"]),
    ("namelist", &["listanazw"], &["namelist"]),
    ("pllist", &["listawł"], &["pllist"]),
    ("erase", &["wymaż"], &["erase", "er"]),
    ("erall", &["usw"], &["erall"]),
    ("erps", &["wżproc"], &["erps"]),
    ("erns", &["wżnazwy"], &["erns"]),
    ("erpls", &["wżwł"], &["erpls"]),
    ("ern", &["wżlistanazw"], &["ern"]),
    ("erpl", &["wżlistawł"], &["erpl"]),
    ("bury", &["pochowaj"], &["bury"]),
    ("buryall", &["pochowajwszystko"], &["buryall"]),
    ("unbury", &["odgrzeb"], &["unbury"]),
    ("unburyall", &["odgrzebwszystko"], &["unburyall"]),
    ("buriedp", &["pochowanyp", "pochowany?"], &["buriedp", "buried?"]),

    // Control
    ("run", &["zapuść"], &["run"]),
    ("runresult", &["zapuśćraportuj"], &["runresult"]),
    ("repeat", &["powtórz"], &["repeat"]),
    ("forever", &["pętla"], &["forever"]),
    ("repcount", &["numpow"], &["repcount"]),
    ("if", &["jeśli"], &["if"]),
    ("ifelse", &["jeśliinaczej"], &["ifelse"]),
    ("test", &["test"], &["test"]),
    ("iftrue", &["jeślitak", "jeślit"], &["iftrue", "ift"]),
    ("iffalse", &["jeślinie", "jeślin"], &["iffalse", "iff"]),
    ("break", &["dość"], &["break"]),
    ("ignore", &["ignoruj"], &["ignore"]),
    ("for", &["dla"], &["for"]),
    ("do.while", &["wykonuj.dopóki"], &["do.while"]),
    ("while", &["dopóki"], &["while"]),
    ("do.until", &["wykonuj.dopókinie"], &["do.until"]),
    ("until", &["dopókinie"], &["until"]),
    ("case", &["wybierz"], &["case"]),
    ("cond", &["warunki"], &["cond"]),
    ("apply", &["odnieś"], &["apply"]),
    ("invoke", &["odwołaj"], &["invoke"]),
    ("foreach", &["dlakażdego"], &["foreach"]),
    ("map", &["mapa"], &["map"]),
    ("filter", &["filtr"], &["filter"]),
    ("find", &["znajdź"], &["find"]),
    ("reduce", &["skróć"], &["reduce"]),
    ("?", &["?"], &["?"]),
];

impl Locale {
    /// The names that the primitive `id` goes by in this locale.
    pub fn aliases(self, id: &str) -> &'static [&'static str] {
        TABLE
            .iter()
            .find(|(i, _, _)| *i == id)
            .map(|(_, pl, en)| match self {
                Locale::Polish => *pl,
                Locale::English => *en,
            })
            .unwrap_or(&[])
    }

    /// Whether `word` is one of the names of the primitive `id`.
    pub fn is(self, word: &str, id: &str) -> bool {
        let word = word.to_lowercase();
        self.aliases(id).iter().any(|a| *a == word)
    }

    /// The name of a primitive, the way error messages show it.
    pub fn display(self, id: &str) -> String {
        self.aliases(id)
            .first()
            .copied()
            .unwrap_or(id)
            .to_uppercase()
    }

    pub fn else_word(self) -> &'static str {
        match self {
            Locale::Polish => "inaczej",
            Locale::English => "else",
        }
    }

    pub fn true_word(self) -> &'static str {
        match self {
            Locale::Polish => "prawda",
            Locale::English => "true",
        }
    }

    pub fn false_word(self) -> &'static str {
        match self {
            Locale::Polish => "fałsz",
            Locale::English => "false",
        }
    }

    /// The variable that has to be true before primitives can be redefined or erased.
    pub fn unlock_var(self) -> &'static str {
        match self {
            Locale::Polish => "przedefp",
            Locale::English => "redefp",
        }
    }

    pub fn ids() -> impl Iterator<Item = &'static str> {
        TABLE.iter().map(|(id, _, _)| *id)
    }
}
