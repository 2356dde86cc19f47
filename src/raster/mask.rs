use bitvec::vec::BitVec;

/// A per-pixel boolean bitmap. The tiled fill uses one as its visited
/// buffer, since the tile can legitimately reproduce the color being
/// replaced and a color test alone cannot tell "already filled" from
/// "still needs filling".
#[derive(Clone)]
pub struct BitmapMask {
    width: u32,
    height: u32,
    data: BitVec,
}

impl BitmapMask {
    pub fn new(width: u32, height: u32, default: bool) -> BitmapMask {
        BitmapMask {
            width,
            height,
            data: BitVec::repeat(default, width as usize * height as usize),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn get_bit(&self, x: i32, y: i32) -> bool {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return false;
        }
        self.data[y as usize * self.width as usize + x as usize]
    }

    pub fn set_bit(&mut self, x: i32, y: i32, value: bool) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        self.data
            .set(y as usize * self.width as usize + x as usize, value);
    }
}
