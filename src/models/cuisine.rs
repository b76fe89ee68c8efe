//! Cuisine catalog: a closed set of cuisines, each owning a non-empty list of
//! sub-cuisines (regional styles or signature dishes).

use crate::labeled_enum;

labeled_enum! {
    pub enum Cuisine {
        Thai => "Thai",
        Cuban => "Cuban",
        Dutch => "Dutch",
        Greek => "Greek",
        Irish => "Irish",
        Swiss => "Swiss",
        Welsh => "Welsh",
        French => "French",
        German => "German",
        Indian => "Indian",
        Kenyan => "Kenyan",
        Korean => "Korean",
        Polish => "Polish",
        Belgian => "Belgian",
        Chinese => "Chinese",
        Israeli => "Israeli",
        Italian => "Italian",
        Mexican => "Mexican",
        Russian => "Russian",
        Spanish => "Spanish",
        Swedish => "Swedish",
        Turkish => "Turkish",
        American => "American",
        Austrian => "Austrian",
        Egyptian => "Egyptian",
        Filipino => "Filipino",
        Georgian => "Georgian",
        Ghanaian => "Ghanaian",
        Jamaican => "Jamaican",
        Japanese => "Japanese",
        Lebanese => "Lebanese",
        Moroccan => "Moroccan",
        Nigerian => "Nigerian",
        Peruvian => "Peruvian",
        Scottish => "Scottish",
        Tunisian => "Tunisian",
        Brazilian => "Brazilian",
        Dominican => "Dominican",
        Ethiopian => "Ethiopian",
        Hungarian => "Hungarian",
        Malaysian => "Malaysian",
        Mongolian => "Mongolian",
        Taiwanese => "Taiwanese",
        Australian => "Australian",
        Indonesian => "Indonesian",
        Portuguese => "Portuguese",
        SriLankan => "Sri Lankan",
        Vietnamese => "Vietnamese",
        NewZealand => "New Zealand",
        Singaporean => "Singaporean",
        PuertoRican => "Puerto Rican",
        SouthAfrican => "South African",
        MiddleEastern => "Middle Eastern",
    }
}

impl Cuisine {
    /// Sub-cuisines offered for this cuisine. Never empty.
    pub fn subtypes(&self) -> &'static [&'static str] {
        match self {
            Cuisine::Thai => &["Tom Yum Soup", "Pad Thai", "Green Curry", "Massaman Curry", "Som Tam (Papaya Salad)", "Satay", "Tom Kha Kai", "Khao Soi"],
            Cuisine::Cuban => &["Ropa Vieja", "Arroz con Pollo", "Lechon Asado", "Tostones", "Empanadas", "Cubano Sandwich"],
            Cuisine::Dutch => &["Stroopwafels", "Herring", "Erwtensoep", "Ossenworst", "Poffertjes", "Hutspot"],
            Cuisine::Greek => &["Gyro", "Moussaka", "Souvlaki", "Greek Salad", "Spanakopita", "Tiropita", "Baklava"],
            Cuisine::Irish => &["Colcannon", "Shepherd's Pie", "Irish Stew", "Boxty", "Soda Bread", "Guinness Beef Stew"],
            Cuisine::Swiss => &["Fondue", "Raclette", "Rösti", "Bircher Muesli", "Zürigeschnätzlets", "Tirggel"],
            Cuisine::Welsh => &["Bara Brith", "Welsh Rarebit", "Laverbread", "Cawl", "Crempogs", "Teisen Lap"],
            Cuisine::French => &["Escargots", "Coq au Vin", "Bouillabaisse", "Ratatouille", "Crème Brûlée", "Macarons", "Croissants"],
            Cuisine::German => &["Sausages (Bratwurst, Currywurst)", "Sauerbraten", "Schweinshaxe", "Spätzle", "Schnitzel", "Black Forest Cake"],
            Cuisine::Indian => &["Punjabi", "Kashmiri", "Awadhi", "Mughlai", "Rajasthani", "Gujarati", "Maharashtrian", "Goan", "Kerala (Malabar)", "Tamil Nadu (Chettinad)", "Andhra", "Telangana", "Bengali", "Odia", "Assamese", "Manipuri", "Nagaland (Naga)", "Sikkimese"],
            Cuisine::Kenyan => &["Ugali", "Sukuma Wiki", "Nyama Choma", "Matooke", "Kachumbari", "Mandazi"],
            Cuisine::Korean => &["Kimchi", "Bibimbap", "Bulgogi", "Jeyuk bokkeum", "Naengmyeon", "Jjajangmyeon", "Jjamppong", "Tteokbokki", "Mandu"],
            Cuisine::Polish => &["Pierogi", "Bigos", "Zurek", "Kielbasa", "Pączki", "Gołąbki"],
            Cuisine::Belgian => &["Waffles", "Fries", "Moules-Frites", "Waterzooi", "Carbonade Flamande", "Speculoos"],
            Cuisine::Chinese => &["Sichuan", "Cantonese", "Shanghai", "Beijing (Peking)", "Hunan", "Fujian", "Xinjiang (Uyghur)", "Yunnan", "Guangdong"],
            Cuisine::Israeli => &["Falafel", "Shawarma", "Hummus", "Shakshuka", "Sabich", "Boureka"],
            Cuisine::Italian => &["Pizza (Margherita, Marinara)", "Pasta (Spaghetti, Penne, Lasagna, Ravioli)", "Risotto", "Gnocchi", "Tiramisu", "Gelato", "Bruschetta", "Caprese Salad"],
            Cuisine::Mexican => &["Tacos (al Pastor, Carnitas, Birria, Pescado)", "Enchiladas", "Chilaquiles", "Quesadillas", "Tamales", "Fajitas", "Guacamole", "Mole (Poblano, Verde)", "Pozole", "Sopes", "Tostadas", "Chimichangas"],
            Cuisine::Russian => &["Borscht", "Beef Stroganoff", "Pelmeni", "Pirozhki", "Blini", "Shashlik"],
            Cuisine::Spanish => &["Paella", "Tapas", "Gazpacho", "Tortilla Española", "Jamón ibérico", "Churros con Chocolate"],
            Cuisine::Swedish => &["Meatballs", "Gravlax", "Janssons Frestelse", "Kanelbulle", "Princess Cake", "Västerbottensost"],
            Cuisine::Turkish => &["Doner Kebab", "Lahmacun", "Manti", "Baklava", "Menemen", "Köfte"],
            Cuisine::American => &["Burgers", "Hot Dogs", "Fried Chicken", "Barbecue Ribs", "Mac and Cheese", "Apple Pie", "Buffalo Wings", "Clam Chowder"],
            Cuisine::Austrian => &["Wiener Schnitzel", "Sacher Torte", "Apple Strudel", "Goulash", "Tafelspitz", "Kaiserschmarren"],
            Cuisine::Egyptian => &["Koshari", "Ful Medames", "Ta'ameya", "Shawarma", "Mahshi", "Umm Ali"],
            Cuisine::Filipino => &["Adobo", "Lechon", "Sinigang", "Sisig", "Lumpia", "Halo-Halo"],
            Cuisine::Georgian => &["Khinkali", "Khachapuri", "Shashlik", "Satsivi", "Pkhali", "Churchkhela"],
            Cuisine::Ghanaian => &["Jollof Rice", "Fufu", "Banku", "Groundnut Soup", "Kelewele", "Waakye"],
            Cuisine::Jamaican => &["Jerk Chicken", "Curry Goat", "Ackee and Saltfish", "Callaloo", "Fried Dumplings", "Patties"],
            Cuisine::Japanese => &["Sushi", "Ramen", "Udon", "Soba", "Tempura", "Yakitori", "Tonkatsu", "Bento", "Kaiseki", "Shojin-ryori"],
            Cuisine::Lebanese => &["Shawarma", "Tabbouleh", "Hummus", "Falafel", "Kibbeh", "Baklava"],
            Cuisine::Moroccan => &["Tagine", "Couscous", "Harira", "B'stilla", "Msemen", "Makroud"],
            Cuisine::Nigerian => &["Jollof Rice", "Suya", "Egusi Soup", "Akara", "Puff-Puff", "Efo Riro"],
            Cuisine::Peruvian => &["Ceviche", "Lomo Saltado", "Aji de Gallina", "Anticuchos", "Causa", "Picarones"],
            Cuisine::Scottish => &["Haggis", "Cullen Skink", "Neeps and Tatties", "Shortbread", "Scotch Egg", "Cranachan"],
            Cuisine::Tunisian => &["Couscous", "Harissa", "Shakshuka", "Brik", "Msemen", "Makroud"],
            Cuisine::Brazilian => &["Feijoada", "Churrasco", "Açaí", "Pão de Queijo", "Moqueca", "Coxinha"],
            Cuisine::Dominican => &["La Bandera", "Sancocho", "Chicharrón", "Mangú", "Arroz con Pollo", "Tres Leches Cake"],
            Cuisine::Ethiopian => &["Injera", "Tibs", "Misir Wot", "Doro Wot", "Sambusa", "Ful Medames"],
            Cuisine::Hungarian => &["Goulash", "Paprikás csirke", "Lángos", "Halászlé", "Dobos Torte", "Rántott hús"],
            Cuisine::Malaysian => &["Nasi Lemak", "Char Kway Teow", "Hainanese Chicken Rice", "Roti Canai", "Laksa", "Chilli Crab"],
            Cuisine::Mongolian => &["Boortsog", "Khorkhog", "Bortsik", "Aaruul", "Khuushuur", "Buuz"],
            Cuisine::Taiwanese => &["Beef Noodle Soup", "Oyster Omelet", "Stinky Tofu", "Gua Bao", "Bubble Tea", "Mochi"],
            Cuisine::Australian => &["Meat Pie", "Fish and Chips", "Vegemite on Toast", "Chiko Roll", "Pavlova", "Lamington"],
            Cuisine::Indonesian => &["Nasi Goreng", "Gado-Gado", "Sate", "Soto", "Martabak", "Krupuk"],
            Cuisine::Portuguese => &["Bacalhau à Brás", "Caldo Verde", "Feijoada", "Pastéis de Nata", "Arroz Doce", "Frango Grelhado"],
            Cuisine::SriLankan => &["Hoppers", "String Hoppers", "Pittu", "Lamprais", "Watalappan", "Kottu"],
            Cuisine::Vietnamese => &["Pho", "Bánh Mì", "Gỏi Cuốn (Spring Rolls)", "Bánh Xèo", "Bún Chả", "Gỏi Đu Đu (Papaya Salad)", "Bánh Khot"],
            Cuisine::NewZealand => &["Hangi", "Pavlova", "Fish and Chips", "Kumara", "Hokey Pokey Ice Cream", "Lamb Shanks"],
            Cuisine::Singaporean => &["Chilli Crab", "Hainanese Chicken Rice", "Laksa", "Char Kway Teow", "Kaya Toast", "Bak Kut Teh"],
            Cuisine::PuertoRican => &["Arroz con Gandules", "Alcapurrias", "Empanadas", "Mofongo", "Churrasco", "Flan"],
            Cuisine::SouthAfrican => &["Bobotie", "Boerewors", "Bunny Chow", "Malva Pudding", "Sosaties", "Melktert"],
            Cuisine::MiddleEastern => &["Persian (Iranian)", "Turkish", "Lebanese", "Syrian", "Iraqi", "Egyptian", "Israeli"],
        }
    }

    pub fn has_subtype(&self, subtype: &str) -> bool {
        self.subtypes().contains(&subtype)
    }
}

/// Total lookup: an unknown or missing cuisine has no subtypes.
pub fn subtypes_for(cuisine: Option<Cuisine>) -> &'static [&'static str] {
    cuisine.map(|c| c.subtypes()).unwrap_or(&[])
}

/// Same as [`subtypes_for`] but keyed by the cuisine label as typed in a form.
pub fn subtypes_for_label(label: &str) -> &'static [&'static str] {
    subtypes_for(label.parse().ok())
}

/// One row of the cuisine catalog as served to clients
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CuisineCatalogEntry {
    pub cuisine: String,
    pub subtypes: Vec<String>,
}

pub fn catalog() -> Vec<CuisineCatalogEntry> {
    Cuisine::ALL
        .iter()
        .map(|c| CuisineCatalogEntry {
            cuisine: c.label().to_string(),
            subtypes: c.subtypes().iter().map(|s| s.to_string()).collect(),
        })
        .collect()
}
